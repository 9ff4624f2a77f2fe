//! Traversal engines for the quill expression IR.
//!
//! Every pass over the IR is built on one of two traits instead of ad hoc
//! recursion: [`RewritePass`] for transformations that produce a new tree
//! (sharing every unchanged subtree with the input) and [`VisitPass`] for
//! read-only analyses. Both engines treat the tree as what it really is, a
//! DAG: a subexpression referenced from several parents is processed once
//! per traversal, keyed by node identity.

pub mod rewrite;
pub mod visit;

pub use rewrite::{rewrite, RewritePass, Rewriter};
pub use visit::{visit, VisitPass, Visitor};

/// A pass with no overrides: rewrites return the input unchanged and visits
/// do nothing beyond counting.
pub struct NoopPass;

impl RewritePass for NoopPass {
    fn name(&self) -> &str {
        "noop"
    }
}

impl VisitPass for NoopPass {
    fn name(&self) -> &str {
        "noop"
    }
}
