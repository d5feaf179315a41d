// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use super::{full_snapshot, snapshot_with_context};
use crate::doc::fixtures::demo_document;
use crate::doc::{Document, LiveNode, LiveParam, NodeBody, ParameterBody};
use crate::extract::Diagnostics;
use crate::model::{InstanceId, Snapshot};

fn iid(value: &str) -> InstanceId {
    InstanceId::new(value).expect("instance id")
}

fn bare_param(doc: &mut Document, id: &str) {
    let param = LiveParam::new(iid(id), id);
    let node = LiveNode::new(iid(id), id, NodeBody::Parameter(ParameterBody::new(param)));
    doc.add_node(node);
}

/// p1 -> p2 -> ... -> pN, inserted out of order on purpose.
fn chain_doc(len: usize) -> Document {
    let mut doc = Document::new();
    let ids: Vec<String> = (1..=len).map(|i| format!("p{i}")).collect();
    for id in ids.iter().rev() {
        bare_param(&mut doc, id);
    }
    for pair in ids.windows(2) {
        assert!(doc.connect(&iid(&pair[0]), &iid(&pair[1])));
    }
    doc
}

fn keys(snapshot: &Snapshot) -> Vec<&str> {
    snapshot.keys().map(|k| k.as_str()).collect()
}

#[test]
fn full_snapshot_is_in_execution_order() {
    let doc = chain_doc(3);
    let mut diag = Diagnostics::new();
    let snapshot = full_snapshot(&doc, &mut diag);
    assert_eq!(keys(&snapshot), vec!["p1", "p2", "p3"]);
    assert!(diag.is_empty());
}

#[test]
fn full_snapshot_covers_the_demo_chain() {
    let doc = demo_document();
    let mut diag = Diagnostics::new();
    let snapshot = full_snapshot(&doc, &mut diag);
    assert_eq!(
        keys(&snapshot),
        vec!["slider-radius", "script-circle", "comp-area", "panel-out"]
    );
}

#[test]
fn cycle_members_follow_the_sorted_prefix() {
    let mut doc = Document::new();
    for id in ["a", "b", "s"] {
        bare_param(&mut doc, id);
    }
    assert!(doc.connect(&iid("s"), &iid("a")));
    assert!(doc.connect(&iid("a"), &iid("b")));
    assert!(doc.connect(&iid("b"), &iid("a")));

    let mut diag = Diagnostics::new();
    let snapshot = full_snapshot(&doc, &mut diag);
    // s is acyclic and sorts first; a and b stay in encounter order.
    assert_eq!(keys(&snapshot), vec!["s", "a", "b"]);
}

#[rstest]
#[case(0, vec!["script-circle"])]
#[case(1, vec!["slider-radius", "script-circle", "comp-area"])]
#[case(2, vec!["slider-radius", "script-circle", "comp-area", "panel-out"])]
fn context_expands_breadth_first(#[case] depth: u32, #[case] expected: Vec<&str>) {
    let doc = demo_document();
    let mut diag = Diagnostics::new();
    let snapshot = snapshot_with_context(&doc, &[iid("script-circle")], depth, &mut diag);
    assert_eq!(keys(&snapshot), expected);
}

#[test]
fn requested_nodes_are_flagged_selected_context_is_not() {
    let mut doc = demo_document();
    // A live canvas selection must not leak into context entries.
    doc.find_node_mut(&iid("slider-radius"))
        .expect("node")
        .set_selected(true);
    let mut diag = Diagnostics::new();
    let snapshot = snapshot_with_context(&doc, &[iid("script-circle")], 1, &mut diag);
    assert!(snapshot.get(&iid("script-circle")).expect("entry").is_selected());
    assert!(!snapshot.get(&iid("slider-radius")).expect("entry").is_selected());
    assert!(!snapshot.get(&iid("comp-area")).expect("entry").is_selected());
}

#[test]
fn full_snapshot_reports_every_entry_unselected() {
    let mut doc = demo_document();
    doc.find_node_mut(&iid("script-circle"))
        .expect("node")
        .set_selected(true);
    let mut diag = Diagnostics::new();
    let snapshot = full_snapshot(&doc, &mut diag);
    assert!(snapshot.iter().all(|(_, entry)| !entry.is_selected()));
}

#[test]
fn child_param_requests_redirect_to_the_owner() {
    let doc = demo_document();
    let mut diag = Diagnostics::new();
    let snapshot = snapshot_with_context(&doc, &[iid("script-circle-in-x")], 0, &mut diag);
    assert_eq!(keys(&snapshot), vec!["script-circle"]);
    assert!(snapshot.get(&iid("script-circle")).expect("entry").is_selected());
}

#[test]
fn owner_and_child_requests_collapse_to_one_entry() {
    let doc = demo_document();
    let mut diag = Diagnostics::new();
    let requested = [iid("script-circle-in-x"), iid("script-circle")];
    let snapshot = snapshot_with_context(&doc, &requested, 0, &mut diag);
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn unknown_requests_are_dropped() {
    let doc = demo_document();
    let mut diag = Diagnostics::new();
    let snapshot = snapshot_with_context(&doc, &[iid("ghost")], 2, &mut diag);
    assert!(snapshot.is_empty());
}

#[test]
fn expansion_depth_is_clamped() {
    let doc = chain_doc(6);
    let mut diag = Diagnostics::new();
    let snapshot = snapshot_with_context(&doc, &[iid("p1")], 99, &mut diag);
    // Three hops from p1, however large the requested depth.
    assert_eq!(keys(&snapshot), vec!["p1", "p2", "p3", "p4"]);
}
