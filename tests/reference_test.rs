//! Tests for reference nodes and the null-reference contract

use rstest::{fixture, rstest};

use composite_tree::util::testing;
use composite_tree::{ArenaSettings, NodeId, TreeArena, TreeError};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

/// root{child(1){grandchild(2)}}
#[fixture]
fn tree() -> (TreeArena<i32>, NodeId, NodeId) {
    let mut tree = TreeArena::new();
    let root = tree.insert_composite(0);
    let child = tree.insert_composite(1);
    let grandchild = tree.insert_leaf(2);
    tree.push_back(root, child);
    tree.push_back(child, grandchild);
    (tree, root, child)
}

// ============================================================
// Null references
// ============================================================

#[test]
fn given_unbound_reference_when_querying_then_answers_empty() {
    let mut tree: TreeArena<i32> = TreeArena::new();
    let null = tree.insert_reference(None);

    assert!(tree.is_reference(null));
    assert!(tree.is_null_reference(null));
    assert_eq!(tree.size(null), 0);
    assert_eq!(tree.nested_hierarchy_size(null), 0);
    assert_eq!(tree.payload(null), None);
    assert_eq!(tree.begin(null), tree.end(null));
    assert_eq!(tree.children(null).count(), 0);
}

#[test]
fn given_null_reference_when_pushing_back_then_rejected() {
    let mut tree: TreeArena<i32> = TreeArena::new();
    let null = tree.insert_reference(None);
    let leaf = tree.insert_leaf(1);

    assert_eq!(
        tree.try_push_back(null, leaf),
        Err(TreeError::NodeNotFound(null))
    );
    assert!(!tree.push_back(null, leaf));
    assert_eq!(tree.clear(null), 0);
}

#[rstest]
fn given_bound_reference_when_target_removed_then_reads_as_null(
    tree: (TreeArena<i32>, NodeId, NodeId),
) {
    let (mut tree, root, child) = tree;
    let alias = tree.insert_reference(Some(child));
    tree.push_back(root, alias);

    assert_eq!(tree.remove(child), 2);

    assert!(tree.contains(alias));
    assert!(tree.is_null_reference(alias));
    assert!(!tree.points_to(alias, child));
    assert_eq!(tree.size(root), 1);
}

#[test]
fn given_stale_handle_when_querying_then_every_predicate_is_false() {
    let mut tree: TreeArena<i32> = TreeArena::new();
    let leaf = tree.insert_leaf(1);
    tree.remove(leaf);

    assert!(!tree.is_leaf(leaf));
    assert!(!tree.is_composite(leaf));
    assert!(!tree.is_reference(leaf));
    assert!(!tree.is_null_reference(leaf));
    assert!(!tree.is_traversable(leaf));
    assert_eq!(tree.parent(leaf), None);
}

// ============================================================
// Assignment and reset
// ============================================================

#[rstest]
fn given_reference_source_when_assigning_then_chain_collapses(
    tree: (TreeArena<i32>, NodeId, NodeId),
) {
    let (mut tree, _root, child) = tree;
    let first = tree.insert_reference(Some(child));
    tree.set_traversable(first, true);
    let second = tree.insert_reference(None);

    assert!(tree.assign(second, first));

    assert!(tree.points_to(second, child));
    assert!(!tree.points_to(second, first));
    assert!(tree.is_traversable(second));
    assert_eq!(tree.size(second), 1);
}

#[rstest]
fn given_plain_source_when_assigning_then_keeps_own_flag(tree: (TreeArena<i32>, NodeId, NodeId)) {
    let (mut tree, root, child) = tree;
    let alias = tree.insert_reference(Some(root));
    tree.set_traversable(alias, true);

    tree.assign(alias, child);

    assert!(tree.points_to(alias, child));
    assert!(tree.is_traversable(alias));
}

#[rstest]
fn given_non_reference_when_assigning_then_reports_not_reference(
    tree: (TreeArena<i32>, NodeId, NodeId),
) {
    let (mut tree, root, child) = tree;
    assert_eq!(
        tree.try_assign(root, child),
        Err(TreeError::NotReference(root))
    );
}

#[rstest]
fn given_bound_reference_when_reset_then_becomes_null_once(tree: (TreeArena<i32>, NodeId, NodeId)) {
    let (mut tree, _root, child) = tree;
    let alias = tree.insert_reference(Some(child));

    assert!(tree.reset(alias));
    assert!(tree.is_null_reference(alias));
    assert!(!tree.reset(alias));
    assert!(tree.contains(child));
}

// ============================================================
// Traversable flag
// ============================================================

#[rstest]
fn given_flag_toggled_when_counting_then_size_follows_flag(tree: (TreeArena<i32>, NodeId, NodeId)) {
    let (mut tree, _root, child) = tree;
    let alias = tree.insert_reference(Some(child));

    assert_eq!(tree.size(alias), 0);
    tree.set_traversable(alias, true);
    assert_eq!(tree.size(alias), 1);
    assert_eq!(tree.nested_hierarchy_size(alias), 1);
    assert_eq!(
        tree.children(alias).collect::<Vec<_>>(),
        tree.children(child).collect::<Vec<_>>()
    );
}

#[rstest]
fn given_reference_to_ancestor_when_not_traversable_then_walk_terminates(
    tree: (TreeArena<i32>, NodeId, NodeId),
) {
    let (mut tree, root, child) = tree;
    let back = tree.insert_reference(Some(root));
    tree.push_back(child, back);

    assert_eq!(tree.pre_order(root).count(), 3);
    assert_eq!(tree.nested_hierarchy_size(root), 3);
}

#[test]
fn given_traversable_default_when_inserting_then_reference_uses_setting() {
    let settings = ArenaSettings {
        traversable_references: true,
        ..ArenaSettings::default()
    };
    let mut tree: TreeArena<i32> = TreeArena::with_settings(settings);
    let root = tree.insert_composite(0);
    let leaf = tree.insert_leaf(1);
    tree.push_back(root, leaf);

    let alias = tree.insert_reference(Some(root));

    assert!(tree.is_traversable(alias));
    assert_eq!(tree.size(alias), 1);
}

// ============================================================
// Mutation through references
// ============================================================

#[rstest]
fn given_reference_to_composite_when_pushing_back_then_target_grows(
    tree: (TreeArena<i32>, NodeId, NodeId),
) {
    let (mut tree, _root, child) = tree;
    let alias = tree.insert_reference(Some(child));
    let leaf = tree.insert_leaf(9);

    assert!(tree.push_back(alias, leaf));

    assert_eq!(tree.parent(leaf), Some(child));
    assert_eq!(tree.children(child).count(), 2);
    assert_eq!(tree.payload_mut(alias).map(|p| {
        *p += 10;
        *p
    }), Some(11));
    assert_eq!(tree.payload(child), Some(&11));
}
