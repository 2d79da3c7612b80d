use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::arena::TreeArena;
use crate::node::{NodeId, NodeKind};
use crate::sequence::ChildSequence;

/// Renders a hierarchy for display.
pub trait TreeNodeConvert {
    fn to_tree_string(&self, root: NodeId) -> Tree<String>;
}

impl<T: Display, S: ChildSequence> TreeNodeConvert for TreeArena<T, S> {
    /// References render as `-> <target>`; their target subtree is only
    /// expanded when the reference is traversable.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, root: NodeId) -> Tree<String> {
        fn label<T: Display, S: ChildSequence>(arena: &TreeArena<T, S>, id: NodeId) -> String {
            match arena.get(id).map(|n| n.kind()) {
                Some(NodeKind::Reference(_)) => match arena.payload(id) {
                    Some(payload) => format!("-> {}", payload),
                    None => "-> (null)".to_string(),
                },
                Some(kind) => kind.payload().map_or_else(String::new, |p| p.to_string()),
                None => "(stale)".to_string(),
            }
        }

        fn build_tree<T: Display, S: ChildSequence>(
            arena: &TreeArena<T, S>,
            id: NodeId,
            parent_tree: &mut Tree<String>,
        ) {
            for child in arena.children(id) {
                let mut child_tree = Tree::new(label(arena, child));
                if arena.is_traversable(child) {
                    build_tree(arena, child, &mut child_tree);
                }
                parent_tree.push(child_tree);
            }
        }

        let mut tree = Tree::new(label(self, root));
        build_tree(self, root, &mut tree);
        tree
    }
}
