//! Batch deletion with tombstones.
//!
//! `remove_if` never erases while it walks. It first marks the matching
//! nodes, then settles references whose target is about to disappear, and
//! only then sweeps the marked entries out of their child sequences.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::arena::TreeArena;
use crate::node::{NodeId, NodeKind};
use crate::sequence::ChildSequence;

/// How `remove_if` treats references whose target gets removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceMode {
    /// Leave the reference alone; its handle goes stale and reads as null
    #[default]
    DoNotTrack,
    /// Remove the reference node as well
    Remove,
    /// Keep the reference node but point it at nothing
    Nullify,
}

impl fmt::Display for ReferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceMode::DoNotTrack => "do-not-track",
            ReferenceMode::Remove => "remove",
            ReferenceMode::Nullify => "nullify",
        };
        f.write_str(name)
    }
}

impl<T, S: ChildSequence> TreeArena<T, S> {
    /// Removes every node below `id` whose payload satisfies `predicate`.
    ///
    /// Only composites are walked. A matching composite is removed with its
    /// whole subtree, so its descendants are not tested. References are never
    /// tested; `mode` decides what happens to those pointing into a removed
    /// subtree. Returns the number of entries erased from child sequences.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn remove_if<F>(&mut self, id: NodeId, mut predicate: F, mode: ReferenceMode) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let Ok(root) = self.mutation_target(id) else {
            return 0;
        };

        let matched = self.mark_matching(root, &mut predicate);
        let dangling = self.dangling_references(root);
        for reference in &dangling {
            match mode {
                ReferenceMode::Remove => {
                    if let Some(node) = self.get_mut(*reference) {
                        node.marked = true;
                    }
                }
                ReferenceMode::Nullify => {
                    if let Some(slot) = self.reference_mut(*reference) {
                        slot.target = None;
                    }
                }
                ReferenceMode::DoNotTrack => {}
            }
        }
        let erased = self.sweep(root);
        debug!(matched, dangling = dangling.len(), erased, %mode, "remove_if");
        erased
    }

    /// [`remove_if`](Self::remove_if) with the configured reference mode.
    pub fn remove_matching<F>(&mut self, id: NodeId, predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mode = self.settings().reference_mode;
        self.remove_if(id, predicate, mode)
    }

    fn owned_children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .and_then(|n| n.kind.children())
            .map(|seq| seq.to_vec())
            .unwrap_or_default()
    }

    fn mark_matching<F>(&mut self, root: NodeId, predicate: &mut F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut matched = 0;
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            for child in self.owned_children(current) {
                let Some(node) = self.get_mut(child) else {
                    continue;
                };
                let verdict = node.kind.payload().map(&mut *predicate);
                match verdict {
                    Some(true) => {
                        node.marked = true;
                        matched += 1;
                    }
                    Some(false) if node.kind.is_composite() => stack.push(child),
                    _ => {}
                }
            }
        }
        matched
    }

    /// Unmarked references below `root` whose target is marked or lies in a marked subtree.
    fn dangling_references(&self, root: NodeId) -> Vec<NodeId> {
        let mut dangling = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            for child in self.owned_children(current) {
                let Some(node) = self.get(child) else {
                    continue;
                };
                if node.marked {
                    continue;
                }
                match &node.kind {
                    NodeKind::Reference(reference) => {
                        if reference.target.is_some_and(|t| self.is_doomed(t)) {
                            dangling.push(child);
                        }
                    }
                    NodeKind::Composite { .. } => stack.push(child),
                    NodeKind::Leaf(_) => {}
                }
            }
        }
        dangling
    }

    fn is_doomed(&self, id: NodeId) -> bool {
        let mut at = Some(id);
        while let Some(current) = at {
            if self.is_marked(current) {
                return true;
            }
            at = self.parent(current);
        }
        false
    }

    fn sweep(&mut self, root: NodeId) -> usize {
        let mut erased = 0;
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let (doomed, kept): (Vec<NodeId>, Vec<NodeId>) = self
                .owned_children(current)
                .into_iter()
                .partition(|child| self.is_marked(*child));
            if !doomed.is_empty() {
                if let Some(seq) = self.get_mut(current).and_then(|n| n.kind.children_mut()) {
                    seq.retain(|child| !doomed.contains(&child));
                }
                for child in doomed {
                    self.drop_subtree(child);
                    erased += 1;
                }
            }
            stack.extend(kept.into_iter().filter(|child| self.is_composite(*child)));
        }
        erased
    }
}
