//! Glue between the hierarchical cursors and Rust iterators.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::arena::TreeArena;
use crate::node::NodeId;
use crate::sequence::ChildSequence;

/// Stateful walk over a hierarchy, compared against an end position.
pub trait HierarchicalCursor: Clone + PartialEq {
    /// Node under the cursor; `None` once exhausted.
    fn current(&self) -> Option<NodeId>;
    fn advance(&mut self);
}

/// Rust iterator over a `[begin, end)` pair of hierarchical cursors.
#[derive(Debug, Clone)]
pub struct Traversal<I> {
    current: I,
    end: I,
}

impl<I: HierarchicalCursor> Traversal<I> {
    pub fn new(begin: I, end: I) -> Self {
        Self {
            current: begin,
            end,
        }
    }
}

impl<I: HierarchicalCursor> Iterator for Traversal<I> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == self.end {
            return None;
        }
        let id = self.current.current()?;
        self.current.advance();
        Some(id)
    }
}

/// Visiting order of [`TreeArena::for_each_mut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    #[default]
    PreOrder,
    PostOrder,
    BreadthFirst,
}

impl<T, S: ChildSequence> TreeArena<T, S> {
    /// Applies `f` to the payload of every descendant of `root` in `order`.
    ///
    /// References have no payload of their own and are skipped, so a target
    /// reachable through a reference is not visited twice.
    #[instrument(level = "trace", skip(self, f))]
    pub fn for_each_mut<F>(&mut self, root: NodeId, order: TraversalOrder, mut f: F) -> usize
    where
        F: FnMut(&mut T),
    {
        let ids: Vec<NodeId> = match order {
            TraversalOrder::PreOrder => self.pre_order(root).collect(),
            TraversalOrder::PostOrder => self.post_order(root).collect(),
            TraversalOrder::BreadthFirst => self.breadth_first(root).collect(),
        };
        let mut visited = 0;
        for id in ids {
            if let Some(payload) = self.get_mut(id).and_then(|n| n.kind.payload_mut()) {
                f(payload);
                visited += 1;
            }
        }
        visited
    }
}
