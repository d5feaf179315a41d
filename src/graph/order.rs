// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Execution-order sort.
//!
//! Kahn's algorithm over the `targets` edges, restricted to nodes present in
//! the snapshot. Ties keep snapshot insertion order. Nodes caught in a cycle
//! have no valid topological position; they are appended after the sorted
//! prefix in their original order rather than failing the request.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{InstanceId, Snapshot};

pub fn sort_by_execution(snapshot: Snapshot) -> Snapshot {
    let keys: Vec<InstanceId> = snapshot.keys().cloned().collect();
    let key_set: HashSet<&InstanceId> = keys.iter().collect();

    let mut edges: HashMap<&InstanceId, Vec<&InstanceId>> = HashMap::new();
    let mut indegree: HashMap<&InstanceId, usize> = keys.iter().map(|k| (k, 0)).collect();
    for key in &keys {
        let descriptor = snapshot.get(key).expect("key tracks entry");
        for target in descriptor.targets() {
            let Some(target) = key_set.get(target) else {
                continue;
            };
            if *target == key {
                continue;
            }
            edges.entry(key).or_default().push(*target);
            if let Some(count) = indegree.get_mut(*target) {
                *count += 1;
            }
        }
    }

    let mut queue: VecDeque<&InstanceId> = keys
        .iter()
        .filter(|key| indegree.get(*key) == Some(&0))
        .collect();
    let mut sorted: Vec<InstanceId> = Vec::with_capacity(keys.len());
    while let Some(key) = queue.pop_front() {
        sorted.push(key.clone());
        if let Some(targets) = edges.get(key) {
            for target in targets {
                let count = indegree.get_mut(*target).expect("all keys have a degree");
                *count -= 1;
                if *count == 0 {
                    queue.push_back(*target);
                }
            }
        }
    }

    // Anything left has positive indegree and sits on a cycle.
    for key in &keys {
        if !sorted.contains(key) {
            sorted.push(key.clone());
        }
    }

    snapshot.reordered(sorted)
}
