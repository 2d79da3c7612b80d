//! Type-erased linear cursors.
//!
//! A [`PolymorphicIterator`] owns one boxed cursor implementation and forwards
//! every step to it. The concrete implementation is chosen by the child
//! container, so the same iterator type walks a linked list, a vector, or a
//! leaf that has nothing to walk.
//!
//! Two category instantiations exist:
//! * [`BidirectionalIterator`]: `get`, `inc`, `dec`, equality.
//! * [`RandomAccessIterator`]: the above plus advance, difference, offset,
//!   ordering and `+`/`-`. These methods are not defined for the
//!   bidirectional instantiation at all.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Sub};

use generational_arena::Index;

use crate::node::NodeId;

/// Walking direction of a linear cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Position of a cursor inside its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Logical index into a contiguous range, the length being the end
    Position(usize),
    /// Link of a list-backed range
    Link(Index),
    /// One past the last link of a list-backed range
    End,
    /// Leaf-like range: begin and end coincide
    Degenerate,
}

/// Identity of a cursor position, used for equality across type erasure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorKey {
    /// Composite owning the walked sequence, None for degenerate cursors
    pub owner: Option<NodeId>,
    pub direction: Direction,
    pub slot: Slot,
}

impl CursorKey {
    pub const DEGENERATE: CursorKey = CursorKey {
        owner: None,
        direction: Direction::Forward,
        slot: Slot::Degenerate,
    };
}

/// Capability interface every cursor implementation provides.
pub trait CursorImpl<'a>: fmt::Debug {
    /// Child handle under the cursor, `None` at the end of the range.
    fn get(&self) -> Option<NodeId>;
    fn inc(&mut self);
    fn dec(&mut self);
    fn key(&self) -> CursorKey;
    fn clone_box(&self) -> Box<dyn CursorImpl<'a> + 'a>;

    fn equal(&self, other: &dyn CursorImpl<'a>) -> bool {
        self.key() == other.key()
    }
}

/// Extra capabilities of cursors over contiguous storage.
pub trait RandomAccessImpl<'a>: CursorImpl<'a> {
    /// Logical distance from the start of the range.
    fn index(&self) -> usize;
    fn advance_forwards(&mut self, n: usize);
    fn advance_backwards(&mut self, n: usize);
    /// Child `n` positions away from the cursor, if inside the range.
    fn offset(&self, n: isize) -> Option<NodeId>;
    fn as_cursor(&self) -> &(dyn CursorImpl<'a> + 'a);
    fn as_cursor_mut(&mut self) -> &mut (dyn CursorImpl<'a> + 'a);
    fn clone_random(&self) -> Box<dyn RandomAccessImpl<'a> + 'a>;

    fn less(&self, other: &dyn RandomAccessImpl<'a>) -> bool {
        self.index() < other.index()
    }

    fn greater(&self, other: &dyn RandomAccessImpl<'a>) -> bool {
        self.index() > other.index()
    }

    fn difference(&self, other: &dyn RandomAccessImpl<'a>) -> isize {
        self.index() as isize - other.index() as isize
    }
}

/// Bridges the two trait objects so [`PolymorphicIterator`] can be generic
/// over its category.
pub trait ErasedCursor<'a> {
    fn cursor(&self) -> &(dyn CursorImpl<'a> + 'a);
    fn cursor_mut(&mut self) -> &mut (dyn CursorImpl<'a> + 'a);
    fn duplicate(&self) -> Box<Self>;
}

impl<'a> ErasedCursor<'a> for dyn CursorImpl<'a> + 'a {
    fn cursor(&self) -> &(dyn CursorImpl<'a> + 'a) {
        self
    }

    fn cursor_mut(&mut self) -> &mut (dyn CursorImpl<'a> + 'a) {
        self
    }

    fn duplicate(&self) -> Box<Self> {
        self.clone_box()
    }
}

impl<'a> ErasedCursor<'a> for dyn RandomAccessImpl<'a> + 'a {
    fn cursor(&self) -> &(dyn CursorImpl<'a> + 'a) {
        self.as_cursor()
    }

    fn cursor_mut(&mut self) -> &mut (dyn CursorImpl<'a> + 'a) {
        self.as_cursor_mut()
    }

    fn duplicate(&self) -> Box<Self> {
        self.clone_random()
    }
}

/// Value-semantic iterator over one type-erased cursor implementation.
///
/// A default-constructed iterator holds nothing; it compares equal only to
/// other empty iterators and dereferences to `None`.
pub struct PolymorphicIterator<'a, E: ?Sized + ErasedCursor<'a>> {
    imp: Option<Box<E>>,
    _borrow: PhantomData<&'a ()>,
}

pub type BidirectionalIterator<'a> = PolymorphicIterator<'a, dyn CursorImpl<'a> + 'a>;
pub type RandomAccessIterator<'a> = PolymorphicIterator<'a, dyn RandomAccessImpl<'a> + 'a>;

impl<'a, E: ?Sized + ErasedCursor<'a>> PolymorphicIterator<'a, E> {
    pub fn new(imp: Box<E>) -> Self {
        Self {
            imp: Some(imp),
            _borrow: PhantomData,
        }
    }

    pub fn empty() -> Self {
        Self {
            imp: None,
            _borrow: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imp.is_none()
    }

    /// Handle under the iterator; `None` when empty or at the end.
    pub fn get(&self) -> Option<NodeId> {
        self.imp.as_ref().and_then(|imp| imp.cursor().get())
    }

    pub fn inc(&mut self) -> &mut Self {
        if let Some(imp) = self.imp.as_mut() {
            imp.cursor_mut().inc();
        }
        self
    }

    pub fn dec(&mut self) -> &mut Self {
        if let Some(imp) = self.imp.as_mut() {
            imp.cursor_mut().dec();
        }
        self
    }

    /// Copy advanced by one step, leaving `self` in place.
    pub fn succ(&self) -> Self {
        let mut next = self.clone();
        next.inc();
        next
    }

    /// Copy moved back by one step, leaving `self` in place.
    pub fn pred(&self) -> Self {
        let mut prev = self.clone();
        prev.dec();
        prev
    }

    /// Moves the implementation out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        Self {
            imp: self.imp.take(),
            _borrow: PhantomData,
        }
    }

    pub fn key(&self) -> Option<CursorKey> {
        self.imp.as_ref().map(|imp| imp.cursor().key())
    }
}

impl<'a, E: ?Sized + ErasedCursor<'a>> Clone for PolymorphicIterator<'a, E> {
    fn clone(&self) -> Self {
        Self {
            imp: self.imp.as_ref().map(|imp| imp.duplicate()),
            _borrow: PhantomData,
        }
    }
}

impl<'a, E: ?Sized + ErasedCursor<'a>> Default for PolymorphicIterator<'a, E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, E: ?Sized + ErasedCursor<'a>> PartialEq for PolymorphicIterator<'a, E> {
    fn eq(&self, other: &Self) -> bool {
        match (self.imp.as_ref(), other.imp.as_ref()) {
            (Some(a), Some(b)) => a.cursor().equal(b.cursor()),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<'a, E: ?Sized + ErasedCursor<'a>> Eq for PolymorphicIterator<'a, E> {}

impl<'a, E: ?Sized + ErasedCursor<'a>> fmt::Debug for PolymorphicIterator<'a, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicIterator")
            .field("key", &self.key())
            .field("current", &self.get())
            .finish()
    }
}

impl<'a> RandomAccessIterator<'a> {
    pub fn advance_forwards(&mut self, n: usize) -> &mut Self {
        if let Some(imp) = self.imp.as_mut() {
            imp.advance_forwards(n);
        }
        self
    }

    pub fn advance_backwards(&mut self, n: usize) -> &mut Self {
        if let Some(imp) = self.imp.as_mut() {
            imp.advance_backwards(n);
        }
        self
    }

    /// Signed distance `self - other`; `None` unless both walk the same range.
    pub fn difference(&self, other: &Self) -> Option<isize> {
        let (a, b) = self.comparable(other)?;
        Some(a.difference(b))
    }

    pub fn offset(&self, n: isize) -> Option<NodeId> {
        self.imp.as_ref().and_then(|imp| imp.offset(n))
    }

    fn comparable<'s>(
        &'s self,
        other: &'s Self,
    ) -> Option<(&'s (dyn RandomAccessImpl<'a> + 'a), &'s (dyn RandomAccessImpl<'a> + 'a))> {
        let a = self.imp.as_deref()?;
        let b = other.imp.as_deref()?;
        let (ka, kb) = (a.key(), b.key());
        (ka.owner == kb.owner && ka.direction == kb.direction).then_some((a, b))
    }
}

impl<'a> PartialOrd for RandomAccessIterator<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_empty() && other.is_empty() {
            return Some(Ordering::Equal);
        }
        let (a, b) = self.comparable(other)?;
        if a.less(b) {
            Some(Ordering::Less)
        } else if a.greater(b) {
            Some(Ordering::Greater)
        } else {
            Some(Ordering::Equal)
        }
    }
}

impl<'a> Add<usize> for RandomAccessIterator<'a> {
    type Output = Self;

    fn add(mut self, n: usize) -> Self {
        self.advance_forwards(n);
        self
    }
}

impl<'a> Sub<usize> for RandomAccessIterator<'a> {
    type Output = Self;

    fn sub(mut self, n: usize) -> Self {
        self.advance_backwards(n);
        self
    }
}

/// Cursor of leaves and unresolvable references: begin equals end.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegenerateCursor;

impl<'a> CursorImpl<'a> for DegenerateCursor {
    fn get(&self) -> Option<NodeId> {
        None
    }

    fn inc(&mut self) {}

    fn dec(&mut self) {}

    fn key(&self) -> CursorKey {
        CursorKey::DEGENERATE
    }

    fn clone_box(&self) -> Box<dyn CursorImpl<'a> + 'a> {
        Box::new(*self)
    }
}

impl<'a> RandomAccessImpl<'a> for DegenerateCursor {
    fn index(&self) -> usize {
        0
    }

    fn advance_forwards(&mut self, _n: usize) {}

    fn advance_backwards(&mut self, _n: usize) {}

    fn offset(&self, _n: isize) -> Option<NodeId> {
        None
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

/// Rust iterator over a `[begin, end)` pair of polymorphic iterators.
pub struct LinearRange<'a, E: ?Sized + ErasedCursor<'a>> {
    current: PolymorphicIterator<'a, E>,
    end: PolymorphicIterator<'a, E>,
}

impl<'a, E: ?Sized + ErasedCursor<'a>> LinearRange<'a, E> {
    pub fn new(begin: PolymorphicIterator<'a, E>, end: PolymorphicIterator<'a, E>) -> Self {
        Self {
            current: begin,
            end,
        }
    }
}

impl<'a, E: ?Sized + ErasedCursor<'a>> Iterator for LinearRange<'a, E> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == self.end {
            return None;
        }
        let id = self.current.get()?;
        self.current.inc();
        Some(id)
    }
}
