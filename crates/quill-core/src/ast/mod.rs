//! The quill expression IR.
//!
//! Nodes are immutable and shared by `Arc`: the program graph is a DAG, so a
//! subexpression may be referenced from several parents. Everything that asks
//! "is this the same node" compares identity through [`SharedNode`], never
//! structural equality.

use std::sync::Arc;

mod attr;
mod expr;
mod ident;
mod ty;
mod value;

pub use attr::*;
pub use expr::*;
pub use ident::*;
pub use ty::*;
pub use value::*;

/// Runtime identity of a shared node, distinct from structural equality.
/// Valid as a map key for as long as the node it came from is alive.
pub type NodeId = usize;

/// Identity operations on shared IR nodes.
///
/// Two handles are `same_as` when they point at the same allocation; two
/// structurally identical but separately constructed nodes are different.
pub trait SharedNode {
    fn node_id(&self) -> NodeId;
    fn same_as(&self, other: &Self) -> bool;
}

impl<T> SharedNode for Arc<T> {
    fn node_id(&self) -> NodeId {
        Arc::as_ptr(self) as NodeId
    }

    fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}
