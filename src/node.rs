use generational_arena::Index;
use std::fmt;

/// Handle of a node inside a [`TreeArena`](crate::arena::TreeArena).
///
/// Wraps a generational index: once the node is erased the handle goes stale
/// and every arena query answers it with an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) Index);

impl NodeId {
    pub fn index(self) -> Index {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "NodeId({}v{})", slot, generation)
    }
}

impl From<Index> for NodeId {
    fn from(idx: Index) -> Self {
        NodeId(idx)
    }
}

/// Non-owning alias to another node.
///
/// `target == None` is the null reference. A target handle that went stale is
/// treated the same way by the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reference {
    pub(crate) target: Option<NodeId>,
    pub(crate) traversable: bool,
}

impl Reference {
    pub fn new(target: Option<NodeId>, traversable: bool) -> Self {
        Self {
            target,
            traversable,
        }
    }

    /// Raw target handle, without checking that it is still alive.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn is_traversable(&self) -> bool {
        self.traversable
    }
}

/// The three node variants.
#[derive(Debug, Clone)]
pub enum NodeKind<T, S> {
    Leaf(T),
    Composite { payload: T, children: S },
    Reference(Reference),
}

impl<T, S> NodeKind<T, S> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Leaf(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, NodeKind::Composite { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, NodeKind::Reference(_))
    }

    /// Own payload; references carry none.
    pub fn payload(&self) -> Option<&T> {
        match self {
            NodeKind::Leaf(payload) | NodeKind::Composite { payload, .. } => Some(payload),
            NodeKind::Reference(_) => None,
        }
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        match self {
            NodeKind::Leaf(payload) | NodeKind::Composite { payload, .. } => Some(payload),
            NodeKind::Reference(_) => None,
        }
    }

    pub fn children(&self) -> Option<&S> {
        match self {
            NodeKind::Composite { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut S> {
        match self {
            NodeKind::Composite { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            NodeKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn as_reference_mut(&mut self) -> Option<&mut Reference> {
        match self {
            NodeKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

/// Tree vertex stored in the arena.
#[derive(Debug, Clone)]
pub struct TreeNode<T, S> {
    pub(crate) kind: NodeKind<T, S>,
    /// Owning composite, None for root nodes
    pub(crate) parent: Option<NodeId>,
    /// Tombstone set during the mark phase of `remove_if`
    pub(crate) marked: bool,
}

impl<T, S> TreeNode<T, S> {
    pub(crate) fn new(kind: NodeKind<T, S>) -> Self {
        Self {
            kind,
            parent: None,
            marked: false,
        }
    }

    pub fn kind(&self) -> &NodeKind<T, S> {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_predicates_are_exclusive() {
        let kinds: Vec<NodeKind<i32, Vec<NodeId>>> = vec![
            NodeKind::Leaf(1),
            NodeKind::Composite {
                payload: 2,
                children: Vec::new(),
            },
            NodeKind::Reference(Reference::default()),
        ];
        for kind in &kinds {
            let flags = [kind.is_leaf(), kind.is_composite(), kind.is_reference()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
        }
    }

    #[test]
    fn test_reference_has_no_payload() {
        let kind: NodeKind<i32, Vec<NodeId>> = NodeKind::Reference(Reference::default());
        assert!(kind.payload().is_none());
        assert!(kind.children().is_none());
    }

    #[test]
    fn test_display_shows_slot_and_generation() {
        let id = NodeId(Index::from_raw_parts(3, 1));
        assert_eq!(id.to_string(), "NodeId(3v1)");
    }
}
