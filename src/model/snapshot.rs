// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::descriptor::NodeDescriptor;
use super::ids::InstanceId;

/// Point-in-time view of a subset of the graph: an id → descriptor map that
/// preserves insertion order. After sorting, iteration order is execution
/// (dependency) order, and the snapshot serializes as a JSON object in that
/// order. Keys are unique; inserting an existing key replaces the entry
/// without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    order: Vec<InstanceId>,
    entries: BTreeMap<InstanceId, NodeDescriptor>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: InstanceId, descriptor: NodeDescriptor) {
        if !self.entries.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.entries.insert(id, descriptor);
    }

    pub fn get(&self, id: &InstanceId) -> Option<&NodeDescriptor> {
        self.entries.get(id)
    }

    pub fn contains_key(&self, id: &InstanceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in insertion (or post-sort, execution) order.
    pub fn keys(&self) -> impl Iterator<Item = &InstanceId> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, &NodeDescriptor)> {
        self.order.iter().map(|id| {
            let descriptor = self.entries.get(id).expect("order tracks entries");
            (id, descriptor)
        })
    }

    /// Rebuild with the same entries in the given key order. Keys absent
    /// from `order` are dropped; the caller is expected to pass a
    /// permutation of the current key set.
    pub fn reordered(mut self, order: Vec<InstanceId>) -> Self {
        let mut entries = BTreeMap::new();
        let mut kept = Vec::with_capacity(order.len());
        for id in order {
            if let Some(descriptor) = self.entries.remove(&id) {
                entries.insert(id.clone(), descriptor);
                kept.push(id);
            }
        }
        Self {
            order: kept,
            entries,
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (id, descriptor) in self.iter() {
            map.serialize_entry(id, descriptor)?;
        }
        map.end()
    }
}
