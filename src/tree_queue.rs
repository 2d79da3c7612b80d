use std::collections::VecDeque;
use std::fmt;

use itertools::Itertools;
use tracing::instrument;

use crate::arena::{Iter, TreeArena};
use crate::cursor::Direction;
use crate::node::NodeId;
use crate::sequence::{ChildList, ChildSequence};
use crate::traversal::{HierarchicalCursor, Traversal};

/*
Queue based breadth-first walk.

Each queue entry is the unexhausted rest of one sibling range. Visiting a
node enqueues the range of its children, so all nodes of a level are seen
before the first node of the next one. The reverse walk flips every sibling
range but keeps levels in top-down order.
 */

struct Level<'a, S: ChildSequence> {
    current: Iter<'a, S>,
    end: Iter<'a, S>,
}

impl<'a, S: ChildSequence> Level<'a, S> {
    fn of<T>(arena: &'a TreeArena<T, S>, id: NodeId, direction: Direction) -> Self {
        Self {
            current: arena.linear_begin(id, direction),
            end: arena.linear_end(id, direction),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.current == self.end
    }
}

impl<'a, S: ChildSequence> Clone for Level<'a, S> {
    fn clone(&self) -> Self {
        Self {
            current: self.current.clone(),
            end: self.end.clone(),
        }
    }
}

/// Breadth-first hierarchical iterator over the descendants of one root.
///
/// The end position is the empty queue. An empty root range is never
/// enqueued, so begin equals end for a root without children.
pub struct BreadthFirst<'a, T, S: ChildSequence = ChildList> {
    arena: &'a TreeArena<T, S>,
    direction: Direction,
    queue: VecDeque<Level<'a, S>>,
}

impl<'a, T, S: ChildSequence> BreadthFirst<'a, T, S> {
    pub fn begin(arena: &'a TreeArena<T, S>, root: NodeId, direction: Direction) -> Self {
        let mut queue = VecDeque::new();
        let level = Level::of(arena, root, direction);
        if !level.is_exhausted() {
            queue.push_back(level);
        }
        Self {
            arena,
            direction,
            queue,
        }
    }

    pub fn end(arena: &'a TreeArena<T, S>, direction: Direction) -> Self {
        Self {
            arena,
            direction,
            queue: VecDeque::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sibling ranges still waiting to be walked, the current one included.
    pub fn pending_levels(&self) -> usize {
        self.queue.len()
    }

    pub fn current(&self) -> Option<NodeId> {
        self.queue.front().and_then(|level| level.current.get())
    }

    pub fn advance(&mut self) {
        let Some(front) = self.queue.front() else {
            return;
        };
        if !front.is_exhausted() {
            let descend = front.current.get().filter(|id| self.arena.can_descend(*id));
            if let Some(id) = descend {
                let level = Level::of(self.arena, id, self.direction);
                self.queue.push_back(level);
            }
            if let Some(front) = self.queue.front_mut() {
                front.current.inc();
            }
        }
        if self.queue.front().is_some_and(Level::is_exhausted) {
            self.queue.pop_front();
        }
    }
}

impl<'a, T, S: ChildSequence> Clone for BreadthFirst<'a, T, S> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            direction: self.direction,
            queue: self.queue.clone(),
        }
    }
}

impl<'a, T, S: ChildSequence> PartialEq for BreadthFirst<'a, T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.queue.len() == other.queue.len()
            && self
                .queue
                .iter()
                .zip(other.queue.iter())
                .all(|(a, b)| a.current == b.current)
    }
}

impl<'a, T, S: ChildSequence> fmt::Debug for BreadthFirst<'a, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fronts = self
            .queue
            .iter()
            .filter_map(|level| level.current.get())
            .map(|id| id.to_string())
            .join(", ");
        f.debug_struct("BreadthFirst")
            .field("direction", &self.direction)
            .field("pending", &fronts)
            .finish()
    }
}

impl<'a, T, S: ChildSequence> HierarchicalCursor for BreadthFirst<'a, T, S> {
    fn current(&self) -> Option<NodeId> {
        BreadthFirst::current(self)
    }

    fn advance(&mut self) {
        BreadthFirst::advance(self)
    }
}

impl<T, S: ChildSequence> TreeArena<T, S> {
    pub fn bf_begin(&self, root: NodeId) -> BreadthFirst<'_, T, S> {
        BreadthFirst::begin(self, root, Direction::Forward)
    }

    pub fn bf_end(&self, _root: NodeId) -> BreadthFirst<'_, T, S> {
        BreadthFirst::end(self, Direction::Forward)
    }

    pub fn rbf_begin(&self, root: NodeId) -> BreadthFirst<'_, T, S> {
        BreadthFirst::begin(self, root, Direction::Reverse)
    }

    pub fn rbf_end(&self, _root: NodeId) -> BreadthFirst<'_, T, S> {
        BreadthFirst::end(self, Direction::Reverse)
    }

    /// Descendants of `root` level by level.
    #[instrument(level = "trace", skip(self))]
    pub fn breadth_first(&self, root: NodeId) -> Traversal<BreadthFirst<'_, T, S>> {
        Traversal::new(self.bf_begin(root), self.bf_end(root))
    }

    /// Level by level, each sibling range right to left.
    #[instrument(level = "trace", skip(self))]
    pub fn rev_breadth_first(&self, root: NodeId) -> Traversal<BreadthFirst<'_, T, S>> {
        Traversal::new(self.rbf_begin(root), self.rbf_end(root))
    }
}
