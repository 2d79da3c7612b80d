use std::fmt;

use itertools::Itertools;
use tracing::instrument;

use crate::arena::{Iter, TreeArena};
use crate::cursor::Direction;
use crate::node::NodeId;
use crate::sequence::{ChildList, ChildSequence};
use crate::traversal::{HierarchicalCursor, Traversal};

/*
Stack based depth-first walk.

Every frame holds the sibling range of one level (begin, end, current).
The bottom frame covers the children of the root, the top frame the level
of the node under the cursor. Going down pushes a frame for the children of
the current node, returning up pops it and exposes the parent again.

Pre-order yields a node before descending into it, post-order dives to the
deepest first descendant before yielding anything and exposes a parent only
after its last child was yielded.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfOrder {
    PreOrder,
    PostOrder,
}

struct Frame<'a, S: ChildSequence> {
    begin: Iter<'a, S>,
    end: Iter<'a, S>,
    current: Iter<'a, S>,
}

impl<'a, S: ChildSequence> Frame<'a, S> {
    fn new(begin: Iter<'a, S>, end: Iter<'a, S>) -> Self {
        Self {
            current: begin.clone(),
            begin,
            end,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.current == self.end
    }
}

impl<'a, S: ChildSequence> Clone for Frame<'a, S> {
    fn clone(&self) -> Self {
        Self {
            begin: self.begin.clone(),
            end: self.end.clone(),
            current: self.current.clone(),
        }
    }
}

/// Depth-first hierarchical iterator over the descendants of one root.
pub struct DepthFirst<'a, T, S: ChildSequence = ChildList> {
    arena: &'a TreeArena<T, S>,
    order: DfOrder,
    direction: Direction,
    stack: Vec<Frame<'a, S>>,
}

impl<'a, T, S: ChildSequence> DepthFirst<'a, T, S> {
    /// Positioned on the first node of the walk.
    pub fn begin(
        arena: &'a TreeArena<T, S>,
        root: NodeId,
        order: DfOrder,
        direction: Direction,
    ) -> Self {
        let frame = Frame::new(
            arena.linear_begin(root, direction),
            arena.linear_end(root, direction),
        );
        let mut it = Self {
            arena,
            order,
            direction,
            stack: vec![frame],
        };
        if order == DfOrder::PostOrder && !it.top_is_exhausted() {
            it.dive();
        }
        it
    }

    /// Past-the-end position: a single frame sitting on the end of the root range.
    pub fn end(
        arena: &'a TreeArena<T, S>,
        root: NodeId,
        order: DfOrder,
        direction: Direction,
    ) -> Self {
        let end = arena.linear_end(root, direction);
        Self {
            arena,
            order,
            direction,
            stack: vec![Frame::new(end.clone(), end)],
        }
    }

    pub fn order(&self) -> DfOrder {
        self.order
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Level of the current node below the root, 0 for the root's children.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Whether the current node comes first among its siblings in walking direction.
    pub fn is_first_child(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|top| !top.is_exhausted() && top.current == top.begin)
    }

    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().and_then(|top| top.current.get())
    }

    pub fn advance(&mut self) {
        match self.order {
            DfOrder::PreOrder => self.next_pre_order(),
            DfOrder::PostOrder => self.next_post_order(),
        }
    }

    fn next_pre_order(&mut self) {
        if self.current().is_some_and(|id| self.arena.can_descend(id)) {
            self.go_down();
            return;
        }
        while let Some(top) = self.stack.last_mut() {
            top.current.inc();
            if !top.is_exhausted() || self.stack.len() == 1 {
                return;
            }
            self.return_up();
        }
    }

    fn next_post_order(&mut self) {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        top.current.inc();
        if top.is_exhausted() {
            // the parent exposed by popping is the next node
            if self.stack.len() != 1 {
                self.return_up();
            }
            return;
        }
        self.dive();
    }

    fn dive(&mut self) {
        while self.current().is_some_and(|id| self.arena.can_descend(id)) {
            self.go_down();
        }
    }

    fn go_down(&mut self) {
        let Some(id) = self.current() else {
            return;
        };
        let frame = Frame::new(
            self.arena.linear_begin(id, self.direction),
            self.arena.linear_end(id, self.direction),
        );
        self.stack.push(frame);
    }

    fn return_up(&mut self) {
        self.stack.pop();
    }

    fn top_is_exhausted(&self) -> bool {
        self.stack.last().map_or(true, Frame::is_exhausted)
    }
}

impl<'a, T, S: ChildSequence> Clone for DepthFirst<'a, T, S> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            order: self.order,
            direction: self.direction,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, T, S: ChildSequence> PartialEq for DepthFirst<'a, T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.stack.len() == other.stack.len()
            && self
                .stack
                .iter()
                .rev()
                .zip(other.stack.iter().rev())
                .all(|(a, b)| a.current == b.current)
    }
}

impl<'a, T, S: ChildSequence> fmt::Debug for DepthFirst<'a, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .stack
            .iter()
            .map(|frame| match frame.current.get() {
                Some(id) => id.to_string(),
                None => "end".to_string(),
            })
            .join(" / ");
        f.debug_struct("DepthFirst")
            .field("order", &self.order)
            .field("direction", &self.direction)
            .field("path", &path)
            .finish()
    }
}

impl<'a, T, S: ChildSequence> HierarchicalCursor for DepthFirst<'a, T, S> {
    fn current(&self) -> Option<NodeId> {
        DepthFirst::current(self)
    }

    fn advance(&mut self) {
        DepthFirst::advance(self)
    }
}

impl<T, S: ChildSequence> TreeArena<T, S> {
    pub fn df_pre_order_begin(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::begin(self, root, DfOrder::PreOrder, Direction::Forward)
    }

    pub fn df_pre_order_end(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::end(self, root, DfOrder::PreOrder, Direction::Forward)
    }

    pub fn rdf_pre_order_begin(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::begin(self, root, DfOrder::PreOrder, Direction::Reverse)
    }

    pub fn rdf_pre_order_end(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::end(self, root, DfOrder::PreOrder, Direction::Reverse)
    }

    pub fn df_post_order_begin(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::begin(self, root, DfOrder::PostOrder, Direction::Forward)
    }

    pub fn df_post_order_end(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::end(self, root, DfOrder::PostOrder, Direction::Forward)
    }

    pub fn rdf_post_order_begin(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::begin(self, root, DfOrder::PostOrder, Direction::Reverse)
    }

    pub fn rdf_post_order_end(&self, root: NodeId) -> DepthFirst<'_, T, S> {
        DepthFirst::end(self, root, DfOrder::PostOrder, Direction::Reverse)
    }

    /// Descendants of `root`, parents before children.
    #[instrument(level = "trace", skip(self))]
    pub fn pre_order(&self, root: NodeId) -> Traversal<DepthFirst<'_, T, S>> {
        Traversal::new(self.df_pre_order_begin(root), self.df_pre_order_end(root))
    }

    /// Pre-order with every sibling range walked right to left.
    #[instrument(level = "trace", skip(self))]
    pub fn rev_pre_order(&self, root: NodeId) -> Traversal<DepthFirst<'_, T, S>> {
        Traversal::new(self.rdf_pre_order_begin(root), self.rdf_pre_order_end(root))
    }

    /// Descendants of `root`, children before parents.
    #[instrument(level = "trace", skip(self))]
    pub fn post_order(&self, root: NodeId) -> Traversal<DepthFirst<'_, T, S>> {
        Traversal::new(self.df_post_order_begin(root), self.df_post_order_end(root))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn rev_post_order(&self, root: NodeId) -> Traversal<DepthFirst<'_, T, S>> {
        Traversal::new(
            self.rdf_post_order_begin(root),
            self.rdf_post_order_end(root),
        )
    }
}
