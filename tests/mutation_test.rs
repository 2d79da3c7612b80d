//! Tests for structural mutation: push_back, relocate_to, clone_subtree, clear

use pretty_assertions::assert_eq;

use composite_tree::util::testing::{self, payloads, scenario_tree};
use composite_tree::{ChildList, ChildSequence, NodeId, TreeArena, TreeError};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn child_payloads<S: ChildSequence>(tree: &TreeArena<i32, S>, id: NodeId) -> Vec<i32> {
    payloads(tree, tree.children(id))
}

fn find<S: ChildSequence>(tree: &TreeArena<i32, S>, root: NodeId, payload: i32) -> NodeId {
    tree.pre_order(root)
        .find(|id| tree.payload(*id) == Some(&payload))
        .expect("payload in fixture")
}

// ============================================================
// Relocation
// ============================================================

#[test]
fn given_node_when_relocating_then_parent_and_sequences_follow() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let d = find(&tree, root, 4);
    let g = find(&tree, root, 6);

    assert!(tree.relocate_to(d, g));

    assert_eq!(tree.parent(d), Some(g));
    assert_eq!(child_payloads(&tree, g), vec![7, 4]);
    assert_eq!(
        payloads(&tree, tree.pre_order(root)),
        vec![2, 1, 6, 7, 8, 4, 3, 5]
    );
    assert_eq!(tree.nested_hierarchy_size(root), 8);
}

#[test]
fn given_leaf_target_when_relocating_then_nothing_changes() {
    let (mut tree, root) = scenario_tree::<Vec<NodeId>>();
    let d = find(&tree, root, 4);
    let h = find(&tree, root, 8);
    let b = find(&tree, root, 2);

    assert!(!tree.relocate_to(d, h));
    assert_eq!(tree.try_relocate_to(d, h), Err(TreeError::NotComposite(h)));

    assert_eq!(tree.parent(d), Some(b));
    assert_eq!(
        payloads(&tree, tree.pre_order(root)),
        vec![2, 1, 4, 3, 5, 6, 7, 8]
    );
}

#[test]
fn given_descendant_target_when_relocating_then_cycle_is_rejected() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let b = find(&tree, root, 2);
    let c = find(&tree, root, 3);

    assert_eq!(
        tree.try_relocate_to(b, c),
        Err(TreeError::CycleDetected { node: b, target: c })
    );
    assert!(!tree.relocate_to(b, b));
    assert_eq!(tree.parent(b), Some(root));
}

#[test]
fn given_root_when_relocating_then_it_is_simply_appended() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let loose = tree.insert_composite(42);

    assert!(tree.relocate_to(loose, root));

    assert_eq!(child_payloads(&tree, root), vec![2, 6, 42]);
    assert_eq!(tree.roots().collect::<Vec<_>>(), vec![root]);
}

// ============================================================
// push_back / extend / detach
// ============================================================

#[test]
fn given_parented_child_when_pushing_elsewhere_then_it_moves() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let a = find(&tree, root, 1);
    let i = find(&tree, root, 7);

    assert!(tree.push_back(i, a));

    assert_eq!(child_payloads(&tree, i), vec![8, 1]);
    assert_eq!(child_payloads(&tree, find(&tree, root, 2)), vec![4]);
}

#[test]
fn given_mixed_children_when_extending_then_counts_accepted_only() {
    let mut tree: TreeArena<i32> = TreeArena::new();
    let root = tree.insert_composite(0);
    let leaf = tree.insert_leaf(1);
    let stale = tree.insert_leaf(2);
    tree.remove(stale);

    let appended = tree.extend(root, [leaf, stale, root]);

    assert_eq!(appended, 1);
    assert_eq!(tree.size(root), 1);
}

#[test]
fn given_child_when_detaching_then_it_becomes_root_and_survives() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let g = find(&tree, root, 6);

    assert!(tree.detach(g));

    assert_eq!(tree.parent(g), None);
    assert_eq!(tree.nested_hierarchy_size(root), 5);
    assert_eq!(payloads(&tree, tree.pre_order(g)), vec![7, 8]);
    assert_eq!(tree.roots().count(), 2);
}

// ============================================================
// clear / remove
// ============================================================

#[test]
fn given_composite_when_clearing_then_descendants_are_destroyed() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let b = find(&tree, root, 2);
    let c = find(&tree, root, 3);

    assert_eq!(tree.clear(b), 4);

    assert_eq!(tree.size(b), 0);
    assert!(!tree.contains(c));
    assert_eq!(tree.len(), 5);
}

#[test]
fn given_leaf_when_clearing_then_noop() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let h = find(&tree, root, 8);

    assert_eq!(tree.clear(h), 0);
    assert_eq!(tree.len(), 9);
}

// ============================================================
// clone_subtree
// ============================================================

#[test]
fn given_subtree_when_cloning_then_copy_is_unparented_and_equal() {
    let (mut tree, root) = scenario_tree::<ChildList>();
    let b = find(&tree, root, 2);

    let copy = tree.clone_subtree(b).expect("clone");

    assert_eq!(tree.parent(copy), None);
    assert_eq!(tree.payload(copy), Some(&2));
    assert_eq!(
        payloads(&tree, tree.pre_order(copy)),
        payloads(&tree, tree.pre_order(b))
    );
    assert_eq!(tree.len(), 9 + 5);
}

#[test]
fn given_clone_when_mutating_copy_then_original_is_untouched() {
    let (mut tree, root) = scenario_tree::<Vec<NodeId>>();
    let copy = tree.clone_subtree(root).expect("clone");

    tree.for_each_mut(
        copy,
        composite_tree::TraversalOrder::PreOrder,
        |p| *p += 100,
    );
    let copied_d = find(&tree, copy, 104);
    tree.clear(copied_d);

    assert_eq!(
        payloads(&tree, tree.pre_order(root)),
        vec![2, 1, 4, 3, 5, 6, 7, 8]
    );
    assert_eq!(
        payloads(&tree, tree.pre_order(copy)),
        vec![102, 101, 104, 106, 107, 108]
    );
}

#[test]
fn given_reference_in_subtree_when_cloning_then_copy_shares_target() {
    let mut tree: TreeArena<i32> = TreeArena::new();
    let root = tree.insert_composite(0);
    let target = tree.insert_leaf(1);
    let alias = tree.insert_reference(Some(target));
    tree.push_back(root, alias);

    let copy = tree.clone_subtree(root).expect("clone");
    let copied_alias = tree.children(copy).next().expect("alias copy");

    assert_ne!(copied_alias, alias);
    assert!(tree.points_to(copied_alias, target));
    assert_eq!(tree.len(), 5);
}

#[test]
fn given_stale_handle_when_cloning_then_returns_none() {
    let mut tree: TreeArena<i32> = TreeArena::new();
    let leaf = tree.insert_leaf(1);
    tree.remove(leaf);
    assert_eq!(tree.clone_subtree(leaf), None);
}
