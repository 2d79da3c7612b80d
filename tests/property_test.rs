//! Property tests over randomly shaped hierarchies

use std::collections::BTreeSet;

use proptest::prelude::*;

use composite_tree::{ChildList, ChildSequence, NodeId, ReferenceMode, TreeArena};

/// Each entry adds one node: (parent pick among existing composites, is composite).
fn shape() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((any::<usize>(), any::<bool>()), 0..40)
}

fn build<S: ChildSequence>(shape: &[(usize, bool)]) -> (TreeArena<u32, S>, NodeId) {
    let mut tree = TreeArena::new();
    let root = tree.insert_composite(0);
    let mut composites = vec![root];
    for (i, (pick, composite)) in shape.iter().enumerate() {
        let payload = i as u32 + 1;
        let id = if *composite {
            tree.insert_composite(payload)
        } else {
            tree.insert_leaf(payload)
        };
        tree.push_back(composites[pick % composites.len()], id);
        if *composite {
            composites.push(id);
        }
    }
    (tree, root)
}

fn payloads<S: ChildSequence>(
    tree: &TreeArena<u32, S>,
    ids: impl Iterator<Item = NodeId>,
) -> Vec<u32> {
    ids.filter_map(|id| tree.payload(id).copied()).collect()
}

proptest! {
    #[test]
    fn given_random_tree_when_walking_then_every_order_visits_each_descendant_once(shape in shape()) {
        let (tree, root) = build::<ChildList>(&shape);
        let expected: BTreeSet<u32> = (1..=shape.len() as u32).collect();

        for walk in [
            payloads(&tree, tree.pre_order(root)),
            payloads(&tree, tree.post_order(root)),
            payloads(&tree, tree.breadth_first(root)),
            payloads(&tree, tree.rev_breadth_first(root)),
        ] {
            prop_assert_eq!(walk.len(), shape.len());
            prop_assert_eq!(walk.into_iter().collect::<BTreeSet<_>>(), expected.clone());
        }
        prop_assert_eq!(tree.nested_hierarchy_size(root), shape.len());
    }

    #[test]
    fn given_random_tree_when_reversing_then_post_order_mirrors_pre_order(shape in shape()) {
        let (tree, root) = build::<ChildList>(&shape);

        let mut pre = payloads(&tree, tree.pre_order(root));
        pre.reverse();
        prop_assert_eq!(payloads(&tree, tree.rev_post_order(root)), pre);

        let mut post = payloads(&tree, tree.post_order(root));
        post.reverse();
        prop_assert_eq!(payloads(&tree, tree.rev_pre_order(root)), post);
    }

    #[test]
    fn given_same_shape_when_container_differs_then_orders_agree(shape in shape()) {
        let (list, list_root) = build::<ChildList>(&shape);
        let (vec, vec_root) = build::<Vec<NodeId>>(&shape);

        prop_assert_eq!(payloads(&list, list.pre_order(list_root)), payloads(&vec, vec.pre_order(vec_root)));
        prop_assert_eq!(payloads(&list, list.post_order(list_root)), payloads(&vec, vec.post_order(vec_root)));
        prop_assert_eq!(payloads(&list, list.breadth_first(list_root)), payloads(&vec, vec.breadth_first(vec_root)));
    }

    #[test]
    fn given_random_tree_when_counting_then_nested_size_is_additive(shape in shape()) {
        let (tree, root) = build::<Vec<NodeId>>(&shape);

        for id in std::iter::once(root).chain(tree.pre_order(root)) {
            let below: usize = tree.children(id).map(|child| tree.nested_hierarchy_size(child)).sum();
            prop_assert_eq!(tree.nested_hierarchy_size(id), tree.size(id) + below);
        }
    }

    #[test]
    fn given_random_tree_when_removing_then_no_survivor_matches(shape in shape(), modulus in 2u32..5) {
        let (mut tree, root) = build::<ChildList>(&shape);

        tree.remove_if(root, |p| p % modulus == 0, ReferenceMode::Remove);

        let survivors: Vec<NodeId> = tree.pre_order(root).collect();
        prop_assert_eq!(survivors.len(), tree.nested_hierarchy_size(root));
        prop_assert_eq!(tree.len(), survivors.len() + 1);
        for id in survivors {
            prop_assert!(tree.payload(id).is_some_and(|p| p % modulus != 0));
            let parent = tree.parent(id);
            prop_assert!(parent.is_some_and(|parent| tree.children(parent).any(|c| c == id)));
        }
    }
}
