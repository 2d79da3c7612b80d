//! Child containers of composite nodes.
//!
//! The container decides the iterator category: [`ChildList`] hands out
//! bidirectional cursors, `Vec<NodeId>` random-access ones.

use std::fmt;

use generational_arena::{Arena, Index};

use crate::cursor::{
    CursorImpl, CursorKey, DegenerateCursor, Direction, ErasedCursor, RandomAccessImpl, Slot,
};
use crate::node::NodeId;

/// Ordered sequence of child handles owned by a composite.
pub trait ChildSequence: Default + Clone + fmt::Debug + 'static {
    /// Erased cursor type, which fixes the iterator category.
    type Cursor<'a>: ?Sized + ErasedCursor<'a>
    where
        Self: 'a;

    fn push_back(&mut self, child: NodeId);
    /// Removes the first occurrence of `child`; false if absent.
    fn remove(&mut self, child: NodeId) -> bool;
    fn retain<F: FnMut(NodeId) -> bool>(&mut self, keep: F);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn to_vec(&self) -> Vec<NodeId>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin<'a>(&'a self, owner: NodeId, direction: Direction) -> Box<Self::Cursor<'a>>;
    fn end<'a>(&'a self, owner: NodeId, direction: Direction) -> Box<Self::Cursor<'a>>;
    /// Begin/end cursor for nodes without a sequence.
    fn degenerate<'a>() -> Box<Self::Cursor<'a>>
    where
        Self: 'a;
}

#[derive(Debug, Clone)]
struct Link {
    child: NodeId,
    prev: Option<Index>,
    next: Option<Index>,
}

/// Doubly linked list with generational links.
///
/// Links stay valid across insertion and removal elsewhere in the list.
#[derive(Debug, Clone)]
pub struct ChildList {
    links: Arena<Link>,
    head: Option<Index>,
    tail: Option<Index>,
}

impl Default for ChildList {
    fn default() -> Self {
        Self {
            links: Arena::new(),
            head: None,
            tail: None,
        }
    }
}

impl ChildList {
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut at = self.head;
        std::iter::from_fn(move || {
            let link = self.links.get(at?)?;
            at = link.next;
            Some(link.child)
        })
    }

    fn unlink(&mut self, idx: Index) {
        let Some(link) = self.links.remove(idx) else {
            return;
        };
        match link.prev {
            Some(prev) => {
                if let Some(p) = self.links.get_mut(prev) {
                    p.next = link.next;
                }
            }
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => {
                if let Some(n) = self.links.get_mut(next) {
                    n.prev = link.prev;
                }
            }
            None => self.tail = link.prev,
        }
    }

    fn link_indices(&self) -> Vec<Index> {
        let mut indices = Vec::with_capacity(self.links.len());
        let mut at = self.head;
        while let Some(idx) = at {
            indices.push(idx);
            at = self.links.get(idx).and_then(|l| l.next);
        }
        indices
    }

    fn first(&self, direction: Direction) -> Option<Index> {
        match direction {
            Direction::Forward => self.head,
            Direction::Reverse => self.tail,
        }
    }

    fn last(&self, direction: Direction) -> Option<Index> {
        self.first(flip(direction))
    }

    fn step(&self, idx: Index, direction: Direction) -> Option<Index> {
        let link = self.links.get(idx)?;
        match direction {
            Direction::Forward => link.next,
            Direction::Reverse => link.prev,
        }
    }
}

fn flip(direction: Direction) -> Direction {
    match direction {
        Direction::Forward => Direction::Reverse,
        Direction::Reverse => Direction::Forward,
    }
}

impl ChildSequence for ChildList {
    type Cursor<'a> = dyn CursorImpl<'a> + 'a;

    fn push_back(&mut self, child: NodeId) {
        let idx = self.links.insert(Link {
            child,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => {
                if let Some(t) = self.links.get_mut(tail) {
                    t.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    fn remove(&mut self, child: NodeId) -> bool {
        let found = self
            .link_indices()
            .into_iter()
            .find(|idx| self.links.get(*idx).map(|l| l.child) == Some(child));
        match found {
            Some(idx) => {
                self.unlink(idx);
                true
            }
            None => false,
        }
    }

    fn retain<F: FnMut(NodeId) -> bool>(&mut self, mut keep: F) {
        for idx in self.link_indices() {
            let child = self.links.get(idx).map(|l| l.child);
            if let Some(child) = child {
                if !keep(child) {
                    self.unlink(idx);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.links.clear();
        self.head = None;
        self.tail = None;
    }

    fn len(&self) -> usize {
        self.links.len()
    }

    fn to_vec(&self) -> Vec<NodeId> {
        self.iter().collect()
    }

    fn begin<'a>(&'a self, owner: NodeId, direction: Direction) -> Box<dyn CursorImpl<'a> + 'a> {
        Box::new(ListCursor {
            list: self,
            owner,
            direction,
            at: self.first(direction),
        })
    }

    fn end<'a>(&'a self, owner: NodeId, direction: Direction) -> Box<dyn CursorImpl<'a> + 'a> {
        Box::new(ListCursor {
            list: self,
            owner,
            direction,
            at: None,
        })
    }

    fn degenerate<'a>() -> Box<dyn CursorImpl<'a> + 'a> {
        Box::new(DegenerateCursor)
    }
}

/// Bidirectional cursor over a [`ChildList`]; `at == None` is the end.
#[derive(Debug, Clone)]
struct ListCursor<'a> {
    list: &'a ChildList,
    owner: NodeId,
    direction: Direction,
    at: Option<Index>,
}

impl<'a> CursorImpl<'a> for ListCursor<'a> {
    fn get(&self) -> Option<NodeId> {
        self.list.links.get(self.at?).map(|l| l.child)
    }

    fn inc(&mut self) {
        if let Some(idx) = self.at {
            self.at = self.list.step(idx, self.direction);
        }
    }

    fn dec(&mut self) {
        self.at = match self.at {
            // stepping before the first element stays on it
            Some(idx) => self.list.step(idx, flip(self.direction)).or(Some(idx)),
            None => self.list.last(self.direction),
        };
    }

    fn key(&self) -> CursorKey {
        CursorKey {
            owner: Some(self.owner),
            direction: self.direction,
            slot: self.at.map_or(Slot::End, Slot::Link),
        }
    }

    fn clone_box(&self) -> Box<dyn CursorImpl<'a> + 'a> {
        Box::new(self.clone())
    }
}

impl ChildSequence for Vec<NodeId> {
    type Cursor<'a> = dyn RandomAccessImpl<'a> + 'a;

    fn push_back(&mut self, child: NodeId) {
        self.push(child);
    }

    fn remove(&mut self, child: NodeId) -> bool {
        match self.iter().position(|c| *c == child) {
            Some(pos) => {
                Vec::remove(self, pos);
                true
            }
            None => false,
        }
    }

    fn retain<F: FnMut(NodeId) -> bool>(&mut self, mut keep: F) {
        Vec::retain(self, |c| keep(*c));
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn to_vec(&self) -> Vec<NodeId> {
        self.clone()
    }

    fn begin<'a>(
        &'a self,
        owner: NodeId,
        direction: Direction,
    ) -> Box<dyn RandomAccessImpl<'a> + 'a> {
        Box::new(SliceCursor {
            items: self.as_slice(),
            owner,
            direction,
            index: 0,
        })
    }

    fn end<'a>(
        &'a self,
        owner: NodeId,
        direction: Direction,
    ) -> Box<dyn RandomAccessImpl<'a> + 'a> {
        Box::new(SliceCursor {
            items: self.as_slice(),
            owner,
            direction,
            index: Vec::len(self),
        })
    }

    fn degenerate<'a>() -> Box<dyn RandomAccessImpl<'a> + 'a> {
        Box::new(DegenerateCursor)
    }
}

/// Random-access cursor over a slice; `index` counts in walking direction.
#[derive(Debug, Clone, Copy)]
struct SliceCursor<'a> {
    items: &'a [NodeId],
    owner: NodeId,
    direction: Direction,
    index: usize,
}

impl<'a> SliceCursor<'a> {
    fn at(&self, logical: usize) -> Option<NodeId> {
        if logical >= self.items.len() {
            return None;
        }
        match self.direction {
            Direction::Forward => self.items.get(logical).copied(),
            Direction::Reverse => self.items.get(self.items.len() - 1 - logical).copied(),
        }
    }
}

impl<'a> CursorImpl<'a> for SliceCursor<'a> {
    fn get(&self) -> Option<NodeId> {
        self.at(self.index)
    }

    fn inc(&mut self) {
        self.index = (self.index + 1).min(self.items.len());
    }

    fn dec(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    fn key(&self) -> CursorKey {
        CursorKey {
            owner: Some(self.owner),
            direction: self.direction,
            slot: Slot::Position(self.index),
        }
    }

    fn clone_box(&self) -> Box<dyn CursorImpl<'a> + 'a> {
        Box::new(*self)
    }
}

impl<'a> RandomAccessImpl<'a> for SliceCursor<'a> {
    fn index(&self) -> usize {
        self.index
    }

    fn advance_forwards(&mut self, n: usize) {
        self.index = self.index.saturating_add(n).min(self.items.len());
    }

    fn advance_backwards(&mut self, n: usize) {
        self.index = self.index.saturating_sub(n);
    }

    fn offset(&self, n: isize) -> Option<NodeId> {
        let logical = (self.index as isize).checked_add(n)?;
        usize::try_from(logical).ok().and_then(|at| self.at(at))
    }

    fn as_cursor(&self) -> &(dyn CursorImpl<'a> + 'a) {
        self
    }

    fn as_cursor_mut(&mut self) -> &mut (dyn CursorImpl<'a> + 'a) {
        self
    }

    fn clone_random(&self) -> Box<dyn RandomAccessImpl<'a> + 'a> {
        Box::new(*self)
    }
}
