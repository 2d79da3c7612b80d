//! Composite object trees with type-erased iterators.
//!
//! A [`TreeArena`] owns leaves, composites and references. Composites keep
//! their children in a [`ChildSequence`]; the sequence type decides whether
//! linear iteration is bidirectional ([`ChildList`]) or random access
//! (`Vec<NodeId>`). Hierarchical iterators walk a subtree depth-first (pre or
//! post order) or breadth-first, forward or reverse, and never descend
//! through references that are not traversable.
//!
//! ```
//! use composite_tree::TreeArena;
//!
//! let mut tree: TreeArena<&str> = TreeArena::new();
//! let root = tree.insert_composite("root");
//! let dir = tree.insert_composite("dir");
//! let file = tree.insert_leaf("file");
//! tree.push_back(root, dir);
//! tree.push_back(dir, file);
//!
//! let names: Vec<_> = tree.pre_order(root).filter_map(|id| tree.payload(id)).collect();
//! assert_eq!(names, vec![&"dir", &"file"]);
//! assert_eq!(tree.nested_hierarchy_size(root), 2);
//! ```

pub mod arena;
pub mod config;
pub mod cursor;
pub mod errors;
pub mod node;
pub mod removal;
pub mod sequence;
pub mod traversal;
pub mod tree_queue;
pub mod tree_stack;
pub mod tree_traits;
pub mod util;

pub use arena::{Children, Iter, TreeArena};
pub use config::ArenaSettings;
pub use cursor::{
    BidirectionalIterator, CursorImpl, CursorKey, DegenerateCursor, Direction, LinearRange,
    PolymorphicIterator, RandomAccessImpl, RandomAccessIterator,
};
pub use errors::{TreeError, TreeResult};
pub use node::{NodeId, NodeKind, Reference, TreeNode};
pub use removal::ReferenceMode;
pub use sequence::{ChildList, ChildSequence};
pub use traversal::{HierarchicalCursor, Traversal, TraversalOrder};
pub use tree_queue::BreadthFirst;
pub use tree_stack::{DepthFirst, DfOrder};
pub use tree_traits::TreeNodeConvert;
