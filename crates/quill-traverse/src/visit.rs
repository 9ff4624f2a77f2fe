//! Read-only analysis walks over the expression DAG.
//!
//! The visitor runs each node's handler once per identity and only counts
//! every further encounter, so shared subexpressions cost one recursion no
//! matter how many parents reference them. Analyses that need the sharing
//! structure (use counts, liveness) read the counter off the returned
//! [`Visitor`].

use std::collections::HashMap;

use quill_core::ast::{
    Expr, ExprConstant, ExprFunction, ExprGlobal, ExprIf, ExprInvoke, ExprLet, ExprPrimitive,
    ExprRef, ExprTuple, ExprTupleGet, ExprVar, NodeId, SharedNode, TyRef,
};
use quill_core::error::Result;

/// Per-variant visit hooks, mirroring [`crate::RewritePass`] except that
/// handlers return nothing: the only observable effects are the pass's own
/// side effects and the visit counter.
#[allow(unused_variables)]
pub trait VisitPass {
    fn name(&self) -> &str;

    fn visit_var(&mut self, vis: &mut Visitor, expr: &ExprRef, var: &ExprVar) -> Result<()> {
        walk_var(self, vis, expr, var)
    }

    fn visit_constant(
        &mut self,
        vis: &mut Visitor,
        expr: &ExprRef,
        constant: &ExprConstant,
    ) -> Result<()> {
        Ok(())
    }

    fn visit_global(&mut self, vis: &mut Visitor, expr: &ExprRef, global: &ExprGlobal) -> Result<()> {
        Ok(())
    }

    fn visit_primitive(
        &mut self,
        vis: &mut Visitor,
        expr: &ExprRef,
        primitive: &ExprPrimitive,
    ) -> Result<()> {
        Ok(())
    }

    fn visit_tuple(&mut self, vis: &mut Visitor, expr: &ExprRef, tuple: &ExprTuple) -> Result<()> {
        walk_tuple(self, vis, expr, tuple)
    }

    fn visit_function(
        &mut self,
        vis: &mut Visitor,
        expr: &ExprRef,
        func: &ExprFunction,
    ) -> Result<()> {
        walk_function(self, vis, expr, func)
    }

    fn visit_invoke(
        &mut self,
        vis: &mut Visitor,
        expr: &ExprRef,
        invoke: &ExprInvoke,
    ) -> Result<()> {
        walk_invoke(self, vis, expr, invoke)
    }

    fn visit_let(&mut self, vis: &mut Visitor, expr: &ExprRef, let_: &ExprLet) -> Result<()> {
        walk_let(self, vis, expr, let_)
    }

    fn visit_if(&mut self, vis: &mut Visitor, expr: &ExprRef, if_: &ExprIf) -> Result<()> {
        walk_if(self, vis, expr, if_)
    }

    fn visit_tuple_get(
        &mut self,
        vis: &mut Visitor,
        expr: &ExprRef,
        get: &ExprTupleGet,
    ) -> Result<()> {
        walk_tuple_get(self, vis, expr, get)
    }

    /// Hook into the type-system collaborator's traversal. No-op by default.
    fn visit_ty(&mut self, vis: &mut Visitor, ty: &TyRef) -> Result<()> {
        Ok(())
    }
}

/// Driver state for one visiting traversal: the identity-keyed visit
/// counter. Lives for exactly one top-level [`visit`] call.
#[derive(Default, Debug)]
pub struct Visitor {
    visit_counter: HashMap<NodeId, usize>,
}

impl Visitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recursive entry point. The first encounter of an identity dispatches
    /// to its handler; every later encounter only increments its counter.
    pub fn visit_expr<P>(&mut self, pass: &mut P, expr: &ExprRef) -> Result<()>
    where
        P: VisitPass + ?Sized,
    {
        if let Some(count) = self.visit_counter.get_mut(&expr.node_id()) {
            *count += 1;
            return Ok(());
        }
        self.dispatch(pass, expr)?;
        self.visit_counter.insert(expr.node_id(), 1);
        Ok(())
    }

    /// How many times `expr`'s identity was reached so far; 0 if never.
    pub fn visits(&self, expr: &ExprRef) -> usize {
        self.visit_counter
            .get(&expr.node_id())
            .copied()
            .unwrap_or(0)
    }

    pub fn counts(&self) -> &HashMap<NodeId, usize> {
        &self.visit_counter
    }

    pub fn into_counts(self) -> HashMap<NodeId, usize> {
        self.visit_counter
    }

    fn dispatch<P>(&mut self, pass: &mut P, expr: &ExprRef) -> Result<()>
    where
        P: VisitPass + ?Sized,
    {
        // Exhaustive on purpose, like the rewriter's dispatch.
        match expr.as_ref() {
            Expr::Var(var) => pass.visit_var(self, expr, var),
            Expr::Constant(constant) => pass.visit_constant(self, expr, constant),
            Expr::Global(global) => pass.visit_global(self, expr, global),
            Expr::Primitive(primitive) => pass.visit_primitive(self, expr, primitive),
            Expr::Tuple(tuple) => pass.visit_tuple(self, expr, tuple),
            Expr::Function(func) => pass.visit_function(self, expr, func),
            Expr::Invoke(invoke) => pass.visit_invoke(self, expr, invoke),
            Expr::Let(let_) => pass.visit_let(self, expr, let_),
            Expr::If(if_) => pass.visit_if(self, expr, if_),
            Expr::TupleGet(get) => pass.visit_tuple_get(self, expr, get),
        }
    }
}

/// Walk a whole expression DAG with a fresh, request-scoped counter and hand
/// the counter back for inspection.
///
/// Evaluation is depth-first and recursive: extremely deep nesting chains
/// can exhaust the stack.
pub fn visit<P>(pass: &mut P, root: &ExprRef) -> Result<Visitor>
where
    P: VisitPass + ?Sized,
{
    let mut vis = Visitor::new();
    vis.visit_expr(pass, root)?;
    tracing::debug!(
        "pass {}: visited {} unique nodes",
        pass.name(),
        vis.counts().len()
    );
    Ok(vis)
}

pub fn walk_var<P>(pass: &mut P, vis: &mut Visitor, _expr: &ExprRef, var: &ExprVar) -> Result<()>
where
    P: VisitPass + ?Sized,
{
    if let Some(ann) = &var.ty {
        pass.visit_ty(vis, ann)?;
    }
    Ok(())
}

pub fn walk_tuple<P>(pass: &mut P, vis: &mut Visitor, _expr: &ExprRef, tuple: &ExprTuple) -> Result<()>
where
    P: VisitPass + ?Sized,
{
    for field in &tuple.fields {
        vis.visit_expr(pass, field)?;
    }
    Ok(())
}

/// Visits value parameters and the body only: type parameters, the return
/// type, and the attribute bag have no expression children.
pub fn walk_function<P>(
    pass: &mut P,
    vis: &mut Visitor,
    _expr: &ExprRef,
    func: &ExprFunction,
) -> Result<()>
where
    P: VisitPass + ?Sized,
{
    for param in &func.params {
        vis.visit_expr(pass, param)?;
    }
    vis.visit_expr(pass, &func.body)
}

pub fn walk_invoke<P>(
    pass: &mut P,
    vis: &mut Visitor,
    _expr: &ExprRef,
    invoke: &ExprInvoke,
) -> Result<()>
where
    P: VisitPass + ?Sized,
{
    vis.visit_expr(pass, &invoke.callee)?;
    for ty_arg in &invoke.ty_args {
        pass.visit_ty(vis, ty_arg)?;
    }
    for arg in &invoke.args {
        vis.visit_expr(pass, arg)?;
    }
    Ok(())
}

/// The bound variable is visited after the value, unlike the rewriter which
/// rewrites it first. Passes that record discovery order observe this.
pub fn walk_let<P>(pass: &mut P, vis: &mut Visitor, _expr: &ExprRef, let_: &ExprLet) -> Result<()>
where
    P: VisitPass + ?Sized,
{
    vis.visit_expr(pass, &let_.value)?;
    vis.visit_expr(pass, &let_.var)?;
    vis.visit_expr(pass, &let_.body)
}

pub fn walk_if<P>(pass: &mut P, vis: &mut Visitor, _expr: &ExprRef, if_: &ExprIf) -> Result<()>
where
    P: VisitPass + ?Sized,
{
    vis.visit_expr(pass, &if_.cond)?;
    vis.visit_expr(pass, &if_.then_branch)?;
    vis.visit_expr(pass, &if_.else_branch)
}

pub fn walk_tuple_get<P>(
    pass: &mut P,
    vis: &mut Visitor,
    _expr: &ExprRef,
    get: &ExprTupleGet,
) -> Result<()>
where
    P: VisitPass + ?Sized,
{
    vis.visit_expr(pass, &get.tuple)
}
