use generational_arena::Arena;
use tracing::{debug, instrument};

use crate::config::ArenaSettings;
use crate::cursor::{Direction, LinearRange, PolymorphicIterator};
use crate::errors::{TreeError, TreeResult};
use crate::node::{NodeId, NodeKind, Reference, TreeNode};
use crate::sequence::{ChildList, ChildSequence};

/// Linear iterator handed out by an arena whose composites store children in `S`.
pub type Iter<'a, S> = PolymorphicIterator<'a, <S as ChildSequence>::Cursor<'a>>;

/// Direct children of a node as a Rust iterator.
pub type Children<'a, S> = LinearRange<'a, <S as ChildSequence>::Cursor<'a>>;

/// Arena owning every node of one or more composite hierarchies.
///
/// Nodes are addressed by [`NodeId`]. A node is owned either by the child
/// sequence of its parent composite or, as a root, by the arena itself.
/// References observe their target without owning it. Erasing a node
/// invalidates its handle; stale handles answer every query with an empty
/// result, so a reference to an erased node behaves as a null reference.
#[derive(Debug, Clone)]
pub struct TreeArena<T, S = ChildList> {
    /// Arena storage for all nodes
    arena: Arena<TreeNode<T, S>>,
    settings: ArenaSettings,
}

impl<T, S: ChildSequence> Default for TreeArena<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: ChildSequence> TreeArena<T, S> {
    pub fn new() -> Self {
        Self::with_settings(ArenaSettings::default())
    }

    pub fn with_settings(settings: ArenaSettings) -> Self {
        Self {
            arena: Arena::with_capacity(settings.initial_capacity.max(1)),
            settings,
        }
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    /// Number of live nodes across all hierarchies.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode<T, S>> {
        self.arena.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode<T, S>> {
        self.arena.get_mut(id.0)
    }

    pub(crate) fn reference_mut(&mut self, id: NodeId) -> Option<&mut Reference> {
        self.get_mut(id).and_then(|n| n.kind.as_reference_mut())
    }

    /// Live nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| NodeId(idx))
    }

    // construction

    #[instrument(level = "trace", skip(self, payload))]
    pub fn insert_leaf(&mut self, payload: T) -> NodeId {
        self.insert(NodeKind::Leaf(payload))
    }

    #[instrument(level = "trace", skip(self, payload))]
    pub fn insert_composite(&mut self, payload: T) -> NodeId {
        self.insert(NodeKind::Composite {
            payload,
            children: S::default(),
        })
    }

    /// Creates a reference. A reference target collapses to what it points at,
    /// so chains never exceed one indirection.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_reference(&mut self, target: Option<NodeId>) -> NodeId {
        let traversable = self.settings.traversable_references;
        let reference = match target {
            Some(source) => self.collapse(source, traversable),
            None => Reference::new(None, traversable),
        };
        self.insert(NodeKind::Reference(reference))
    }

    fn insert(&mut self, kind: NodeKind<T, S>) -> NodeId {
        NodeId(self.arena.insert(TreeNode::new(kind)))
    }

    // queries

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.kind.is_leaf())
    }

    pub fn is_composite(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.kind.is_composite())
    }

    pub fn is_reference(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.kind.is_reference())
    }

    pub fn is_null_reference(&self, id: NodeId) -> bool {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Reference(reference)) => self.resolve_reference(reference).is_none(),
            _ => false,
        }
    }

    /// Whether hierarchical walks may descend through `id`.
    pub fn is_traversable(&self, id: NodeId) -> bool {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Reference(reference)) => reference.traversable,
            Some(_) => true,
            None => false,
        }
    }

    pub fn is_marked(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.marked)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The node `id` stands for: itself, or the live target of a reference.
    pub fn resolve(&self, id: NodeId) -> Option<NodeId> {
        match &self.get(id)?.kind {
            NodeKind::Reference(reference) => self.resolve_reference(reference),
            _ => Some(id),
        }
    }

    /// Live target of a reference node.
    pub fn target(&self, reference: NodeId) -> Option<NodeId> {
        let reference = self.get(reference)?.kind.as_reference()?;
        self.resolve_reference(reference)
    }

    fn resolve_reference(&self, reference: &Reference) -> Option<NodeId> {
        reference.target.filter(|target| self.contains(*target))
    }

    /// Payload of `id`, looked up through references.
    pub fn payload(&self, id: NodeId) -> Option<&T> {
        let id = self.resolve(id)?;
        self.get(id)?.kind.payload()
    }

    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let id = self.resolve(id)?;
        self.get_mut(id)?.kind.payload_mut()
    }

    /// Number of direct children seen by traversal.
    ///
    /// Zero for leaves and for references that are null or not traversable.
    pub fn size(&self, id: NodeId) -> usize {
        self.traversal_sequence(id).map_or(0, |(_, seq)| seq.len())
    }

    /// Number of descendants reachable through traversable edges.
    #[instrument(level = "trace", skip(self))]
    pub fn nested_hierarchy_size(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for child in self.children(current) {
                count += 1;
                if self.is_traversable(child) {
                    stack.push(child);
                }
            }
        }
        count
    }

    /// Descent gate shared by the hierarchical iterators.
    pub(crate) fn can_descend(&self, id: NodeId) -> bool {
        self.is_traversable(id) && self.size(id) > 0
    }

    /// Sequence walked when traversing `id`, with the composite owning it.
    fn traversal_sequence(&self, id: NodeId) -> Option<(NodeId, &S)> {
        match &self.get(id)?.kind {
            NodeKind::Composite { children, .. } => Some((id, children)),
            NodeKind::Reference(reference) if reference.traversable => {
                let target = self.resolve_reference(reference)?;
                self.get(target)?.kind.children().map(|seq| (target, seq))
            }
            _ => None,
        }
    }

    /// Composite that structural mutations addressed to `id` act on.
    pub(crate) fn mutation_target(&self, id: NodeId) -> TreeResult<NodeId> {
        let resolved = self.resolve(id).ok_or(TreeError::NodeNotFound(id))?;
        if self.is_composite(resolved) {
            Ok(resolved)
        } else {
            Err(TreeError::NotComposite(id))
        }
    }

    // linear iteration

    pub fn begin(&self, id: NodeId) -> Iter<'_, S> {
        self.linear_begin(id, Direction::Forward)
    }

    pub fn end(&self, id: NodeId) -> Iter<'_, S> {
        self.linear_end(id, Direction::Forward)
    }

    pub fn rbegin(&self, id: NodeId) -> Iter<'_, S> {
        self.linear_begin(id, Direction::Reverse)
    }

    pub fn rend(&self, id: NodeId) -> Iter<'_, S> {
        self.linear_end(id, Direction::Reverse)
    }

    pub fn linear_begin(&self, id: NodeId, direction: Direction) -> Iter<'_, S> {
        let imp = match self.traversal_sequence(id) {
            Some((owner, seq)) => seq.begin(owner, direction),
            None => S::degenerate(),
        };
        PolymorphicIterator::new(imp)
    }

    pub fn linear_end(&self, id: NodeId, direction: Direction) -> Iter<'_, S> {
        let imp = match self.traversal_sequence(id) {
            Some((owner, seq)) => seq.end(owner, direction),
            None => S::degenerate(),
        };
        PolymorphicIterator::new(imp)
    }

    pub fn children(&self, id: NodeId) -> Children<'_, S> {
        LinearRange::new(self.begin(id), self.end(id))
    }

    pub fn rchildren(&self, id: NodeId) -> Children<'_, S> {
        LinearRange::new(self.rbegin(id), self.rend(id))
    }

    // mutation

    /// Appends `child` to the composite `parent` stands for.
    ///
    /// A child that already has a parent is moved out of its old sequence.
    #[instrument(level = "trace", skip(self))]
    pub fn try_push_back(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let destination = self.mutation_target(parent)?;
        if !self.contains(child) {
            return Err(TreeError::NodeNotFound(child));
        }
        self.ensure_not_ancestor(child, destination)?;

        self.detach(child);
        self.attach(destination, child);
        Ok(())
    }

    /// Lenient [`try_push_back`](Self::try_push_back): rejected appends are no-ops.
    pub fn push_back(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.try_push_back(parent, child) {
            Ok(()) => true,
            Err(e) => {
                debug!("push_back ignored: {}", e);
                false
            }
        }
    }

    /// Appends several children in order; returns how many were appended.
    pub fn extend<I>(&mut self, parent: NodeId, children: I) -> usize
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut appended = 0;
        for child in children {
            if self.push_back(parent, child) {
                appended += 1;
            }
        }
        appended
    }

    /// Moves `id` under `target`. Unparented nodes are appended directly.
    #[instrument(level = "trace", skip(self))]
    pub fn try_relocate_to(&mut self, id: NodeId, target: NodeId) -> TreeResult<()> {
        if !self.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }
        self.try_push_back(target, id)
    }

    /// Lenient relocation: a leaf or otherwise invalid target leaves the tree untouched.
    pub fn relocate_to(&mut self, id: NodeId, target: NodeId) -> bool {
        match self.try_relocate_to(id, target) {
            Ok(()) => true,
            Err(e) => {
                debug!("relocate_to ignored: {}", e);
                false
            }
        }
    }

    /// Takes `id` out of its parent's sequence, turning it into a root.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if let Some(seq) = self.get_mut(parent).and_then(|n| n.kind.children_mut()) {
            seq.remove(id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
        true
    }

    /// Destroys the children of the composite `id` stands for.
    ///
    /// Returns the number of destroyed nodes, descendants included.
    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self, id: NodeId) -> usize {
        let Ok(target) = self.mutation_target(id) else {
            return 0;
        };
        let children = self
            .get_mut(target)
            .and_then(|n| n.kind.children_mut())
            .map(|seq| {
                let ids = seq.to_vec();
                seq.clear();
                ids
            })
            .unwrap_or_default();
        children
            .into_iter()
            .map(|child| self.drop_subtree(child))
            .sum()
    }

    /// Destroys `id` and the subtree it owns. Reference targets survive.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> usize {
        self.detach(id);
        self.drop_subtree(id)
    }

    /// Deep copy of `id` as a new root; references keep their targets.
    #[instrument(level = "trace", skip(self))]
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId>
    where
        T: Clone,
    {
        let root = self.shallow_copy(id)?;
        let mut stack = vec![(id, root)];
        while let Some((source, copy)) = stack.pop() {
            let children = self
                .get(source)
                .and_then(|n| n.kind.children())
                .map(|seq| seq.to_vec())
                .unwrap_or_default();
            for child in children {
                let Some(child_copy) = self.shallow_copy(child) else {
                    continue;
                };
                self.attach(copy, child_copy);
                if self.is_composite(child) {
                    stack.push((child, child_copy));
                }
            }
        }
        Some(root)
    }

    fn shallow_copy(&mut self, id: NodeId) -> Option<NodeId>
    where
        T: Clone,
    {
        let kind = match &self.get(id)?.kind {
            NodeKind::Leaf(payload) => NodeKind::Leaf(payload.clone()),
            NodeKind::Composite { payload, .. } => NodeKind::Composite {
                payload: payload.clone(),
                children: S::default(),
            },
            NodeKind::Reference(reference) => NodeKind::Reference(*reference),
        };
        Some(self.insert(kind))
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let Some(seq) = self.get_mut(parent).and_then(|n| n.kind.children_mut()) else {
            return;
        };
        seq.push_back(child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn ensure_not_ancestor(&self, node: NodeId, target: NodeId) -> TreeResult<()> {
        let mut at = Some(target);
        while let Some(current) = at {
            if current == node {
                return Err(TreeError::CycleDetected { node, target });
            }
            at = self.parent(current);
        }
        Ok(())
    }

    pub(crate) fn drop_subtree(&mut self, root: NodeId) -> usize {
        let mut dropped = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.arena.remove(id.0) {
                dropped += 1;
                if let NodeKind::Composite { children, .. } = node.kind {
                    stack.extend(children.to_vec());
                }
            }
        }
        dropped
    }

    // references

    /// Points `reference` at `source`, collapsing reference sources.
    #[instrument(level = "trace", skip(self))]
    pub fn try_assign(&mut self, reference: NodeId, source: NodeId) -> TreeResult<()> {
        let current = *self
            .get(reference)
            .ok_or(TreeError::NodeNotFound(reference))?
            .kind
            .as_reference()
            .ok_or(TreeError::NotReference(reference))?;
        if !self.contains(source) {
            return Err(TreeError::NodeNotFound(source));
        }
        let collapsed = self.collapse(source, current.traversable);
        if let Some(slot) = self.reference_mut(reference) {
            *slot = collapsed;
        }
        Ok(())
    }

    pub fn assign(&mut self, reference: NodeId, source: NodeId) -> bool {
        match self.try_assign(reference, source) {
            Ok(()) => true,
            Err(e) => {
                debug!("assign ignored: {}", e);
                false
            }
        }
    }

    /// Repoints `reference` at nothing; false if it already was null.
    #[instrument(level = "trace", skip(self))]
    pub fn reset(&mut self, reference: NodeId) -> bool {
        let was_bound = self.target(reference).is_some();
        if let Some(slot) = self.reference_mut(reference) {
            slot.target = None;
        }
        was_bound
    }

    pub fn points_to(&self, reference: NodeId, handle: NodeId) -> bool {
        self.target(reference) == Some(handle)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn set_traversable(&mut self, reference: NodeId, traversable: bool) -> bool {
        match self.reference_mut(reference) {
            Some(slot) => {
                slot.traversable = traversable;
                true
            }
            None => false,
        }
    }

    fn collapse(&self, source: NodeId, traversable: bool) -> Reference {
        match self.get(source).map(|n| &n.kind) {
            Some(NodeKind::Reference(reference)) => {
                Reference::new(self.resolve_reference(reference), reference.traversable)
            }
            Some(_) => Reference::new(Some(source), traversable),
            None => Reference::new(None, traversable),
        }
    }
}
