// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Snapshot assembly: whole-document capture and selection-plus-context
//! capture, both returned in execution order.

use crate::doc::Document;
use crate::extract::{extract_node, Diagnostics};
use crate::model::{InstanceId, Snapshot};

pub mod order;

#[cfg(test)]
mod tests;

/// Context expansion never walks further than this, whatever the caller
/// asked for.
pub const MAX_CONTEXT_DEPTH: u32 = 3;

/// Snapshot of every top-level node, sorted by execution order.
pub fn full_snapshot(doc: &Document, diag: &mut Diagnostics) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for node in doc.objects() {
        snapshot.insert(node.instance_id().clone(), extract_node(doc, node, diag));
    }
    order::sort_by_execution(snapshot)
}

/// Snapshot of the requested nodes plus their graph neighborhood.
///
/// Requested ids naming a child parameter are redirected to the owning
/// component; ids resolving to nothing are dropped. Every requested node is
/// flagged selected in the result. Neighbors are then pulled in breadth
/// first over both edge directions, up to `depth` hops (clamped to
/// [`MAX_CONTEXT_DEPTH`]); context nodes always report unselected, whatever
/// the canvas selection says.
pub fn snapshot_with_context(
    doc: &Document,
    requested: &[InstanceId],
    depth: u32,
    diag: &mut Diagnostics,
) -> Snapshot {
    let depth = depth.min(MAX_CONTEXT_DEPTH);
    let mut snapshot = Snapshot::new();
    let mut frontier: Vec<InstanceId> = Vec::new();

    for id in requested {
        let Some(owner) = doc.top_level_owner(id) else {
            continue;
        };
        if snapshot.contains_key(owner) {
            continue;
        }
        let node = doc.find_node(owner).expect("owner is a top-level node");
        let mut descriptor = extract_node(doc, node, diag);
        descriptor.set_selected(true);
        snapshot.insert(owner.clone(), descriptor);
        frontier.push(owner.clone());
    }

    for _ in 0..depth {
        if frontier.is_empty() {
            break;
        }
        let mut next: Vec<InstanceId> = Vec::new();
        for id in frontier {
            let descriptor = snapshot.get(&id).expect("frontier entries are captured");
            let neighbors: Vec<InstanceId> = descriptor
                .sources()
                .iter()
                .chain(descriptor.targets())
                .cloned()
                .collect();
            for neighbor in neighbors {
                if snapshot.contains_key(&neighbor) || next.contains(&neighbor) {
                    continue;
                }
                let Some(node) = doc.find_node(&neighbor) else {
                    continue;
                };
                snapshot.insert(neighbor.clone(), extract_node(doc, node, diag));
                next.push(neighbor);
            }
        }
        frontier = next;
    }

    order::sort_by_execution(snapshot)
}
