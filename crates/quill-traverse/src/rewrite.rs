//! Functional rewriting of the expression DAG.
//!
//! The rewriter never mutates a node in place: it produces a new tree that
//! shares every unchanged subtree with its input. Results are memoized per
//! node identity for the duration of one top-level [`rewrite`] call, so a
//! subexpression referenced from several parents is rewritten exactly once
//! and stays shared in the output.

use std::collections::HashMap;

use itertools::izip;

use quill_core::ast::{
    Expr, ExprConstant, ExprFunction, ExprGlobal, ExprIf, ExprInvoke, ExprLet, ExprPrimitive,
    ExprRef, ExprTuple, ExprTupleGet, ExprVar, IntoExprRef, NodeId, SharedNode, TyRef,
};
use quill_core::error::{Error, Result};

/// Per-variant rewrite hooks.
///
/// Every hook has a default body: leaves return themselves, composite
/// variants run the structural recursion of the matching `walk_*` function.
/// A concrete pass overrides only the variants it transforms and recurses
/// into children through [`Rewriter::rewrite_expr`], which keeps memoization
/// and sharing preservation in effect.
#[allow(unused_variables)]
pub trait RewritePass {
    fn name(&self) -> &str;

    fn rewrite_var(&mut self, rw: &mut Rewriter, expr: &ExprRef, var: &ExprVar) -> Result<ExprRef> {
        walk_var(self, rw, expr, var)
    }

    fn rewrite_constant(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        constant: &ExprConstant,
    ) -> Result<ExprRef> {
        Ok(expr.clone())
    }

    fn rewrite_global(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        global: &ExprGlobal,
    ) -> Result<ExprRef> {
        Ok(expr.clone())
    }

    fn rewrite_primitive(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        primitive: &ExprPrimitive,
    ) -> Result<ExprRef> {
        Ok(expr.clone())
    }

    fn rewrite_tuple(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        tuple: &ExprTuple,
    ) -> Result<ExprRef> {
        walk_tuple(self, rw, expr, tuple)
    }

    fn rewrite_function(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        func: &ExprFunction,
    ) -> Result<ExprRef> {
        walk_function(self, rw, expr, func)
    }

    fn rewrite_invoke(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        invoke: &ExprInvoke,
    ) -> Result<ExprRef> {
        walk_invoke(self, rw, expr, invoke)
    }

    fn rewrite_let(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        let_: &ExprLet,
    ) -> Result<ExprRef> {
        walk_let(self, rw, expr, let_)
    }

    fn rewrite_if(&mut self, rw: &mut Rewriter, expr: &ExprRef, if_: &ExprIf) -> Result<ExprRef> {
        walk_if(self, rw, expr, if_)
    }

    fn rewrite_tuple_get(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        get: &ExprTupleGet,
    ) -> Result<ExprRef> {
        walk_tuple_get(self, rw, expr, get)
    }

    /// Hook into the type-system collaborator's own rewriting traversal.
    /// Identity by default. Every type-position child of the expression tree
    /// is routed through here; the engine never recurses into types itself.
    fn rewrite_ty(&mut self, rw: &mut Rewriter, ty: &TyRef) -> Result<TyRef> {
        Ok(ty.clone())
    }
}

/// Driver state for one rewriting traversal: the identity-keyed memo table.
///
/// A `Rewriter` lives for exactly one top-level [`rewrite`] call and is
/// discarded afterwards; the memo is never shared across invocations.
#[derive(Default)]
pub struct Rewriter {
    memo: HashMap<NodeId, ExprRef>,
}

impl Rewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recursive entry point. Consults the memo before dispatching, so any
    /// node identity is rewritten at most once per traversal and every
    /// later reference receives the cached result.
    pub fn rewrite_expr<P>(&mut self, pass: &mut P, expr: &ExprRef) -> Result<ExprRef>
    where
        P: RewritePass + ?Sized,
    {
        if let Some(done) = self.memo.get(&expr.node_id()) {
            return Ok(done.clone());
        }
        let new_expr = self.dispatch(pass, expr)?;
        self.memo.insert(expr.node_id(), new_expr.clone());
        Ok(new_expr)
    }

    /// Number of unique nodes rewritten so far.
    pub fn rewritten(&self) -> usize {
        self.memo.len()
    }

    fn dispatch<P>(&mut self, pass: &mut P, expr: &ExprRef) -> Result<ExprRef>
    where
        P: RewritePass + ?Sized,
    {
        // Exhaustive on purpose: a new variant must be wired into the
        // engines before this compiles again.
        match expr.as_ref() {
            Expr::Var(var) => pass.rewrite_var(self, expr, var),
            Expr::Constant(constant) => pass.rewrite_constant(self, expr, constant),
            Expr::Global(global) => pass.rewrite_global(self, expr, global),
            Expr::Primitive(primitive) => pass.rewrite_primitive(self, expr, primitive),
            Expr::Tuple(tuple) => pass.rewrite_tuple(self, expr, tuple),
            Expr::Function(func) => pass.rewrite_function(self, expr, func),
            Expr::Invoke(invoke) => pass.rewrite_invoke(self, expr, invoke),
            Expr::Let(let_) => pass.rewrite_let(self, expr, let_),
            Expr::If(if_) => pass.rewrite_if(self, expr, if_),
            Expr::TupleGet(get) => pass.rewrite_tuple_get(self, expr, get),
        }
    }
}

/// Rewrite a whole expression DAG with a fresh, request-scoped memo.
///
/// Evaluation is depth-first and recursive: extremely deep nesting chains
/// (for example very long `let` sequences) can exhaust the stack.
pub fn rewrite<P>(pass: &mut P, root: &ExprRef) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let mut rw = Rewriter::new();
    let rewritten = rw.rewrite_expr(pass, root)?;
    tracing::debug!(
        "pass {}: rewrote {} unique nodes",
        pass.name(),
        rw.rewritten()
    );
    Ok(rewritten)
}

pub fn walk_var<P>(pass: &mut P, rw: &mut Rewriter, expr: &ExprRef, var: &ExprVar) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    if let Some(ann) = &var.ty {
        let new_ann = pass.rewrite_ty(rw, ann)?;
        if !new_ann.same_as(ann) {
            return Ok(ExprVar::with_ty(var.name.clone(), new_ann).into_ref());
        }
    }
    // A variable without an annotation has no children.
    Ok(expr.clone())
}

pub fn walk_tuple<P>(
    pass: &mut P,
    rw: &mut Rewriter,
    expr: &ExprRef,
    tuple: &ExprTuple,
) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let mut fields = Vec::with_capacity(tuple.fields.len());
    for field in &tuple.fields {
        fields.push(rw.rewrite_expr(pass, field)?);
    }
    if all_same(&fields, &tuple.fields) {
        Ok(expr.clone())
    } else {
        Ok(ExprTuple::new(fields).into_ref())
    }
}

pub fn walk_function<P>(
    pass: &mut P,
    rw: &mut Rewriter,
    expr: &ExprRef,
    func: &ExprFunction,
) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let mut ty_params = Vec::with_capacity(func.ty_params.len());
    for ty_param in &func.ty_params {
        ty_params.push(pass.rewrite_ty(rw, ty_param)?);
    }
    let mut params = Vec::with_capacity(func.params.len());
    for param in &func.params {
        params.push(rewrite_binder(pass, rw, param)?);
    }
    let ret_ty = pass.rewrite_ty(rw, &func.ret_ty)?;
    let body = rw.rewrite_expr(pass, &func.body)?;

    if all_same(&ty_params, &func.ty_params)
        && all_same(&params, &func.params)
        && ret_ty.same_as(&func.ret_ty)
        && body.same_as(&func.body)
    {
        Ok(expr.clone())
    } else {
        Ok(ExprFunction::new(ty_params, params, ret_ty, body, func.attrs.clone()).into_ref())
    }
}

pub fn walk_invoke<P>(
    pass: &mut P,
    rw: &mut Rewriter,
    expr: &ExprRef,
    invoke: &ExprInvoke,
) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let callee = rw.rewrite_expr(pass, &invoke.callee)?;
    let mut ty_args = Vec::with_capacity(invoke.ty_args.len());
    for ty_arg in &invoke.ty_args {
        ty_args.push(pass.rewrite_ty(rw, ty_arg)?);
    }
    let mut args = Vec::with_capacity(invoke.args.len());
    for arg in &invoke.args {
        args.push(rw.rewrite_expr(pass, arg)?);
    }

    if callee.same_as(&invoke.callee)
        && all_same(&ty_args, &invoke.ty_args)
        && all_same(&args, &invoke.args)
    {
        Ok(expr.clone())
    } else {
        Ok(ExprInvoke::new(callee, ty_args, args, invoke.attrs.clone()).into_ref())
    }
}

pub fn walk_let<P>(pass: &mut P, rw: &mut Rewriter, expr: &ExprRef, let_: &ExprLet) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let var = rewrite_binder(pass, rw, &let_.var)?;
    let value = rw.rewrite_expr(pass, &let_.value)?;
    let body = rw.rewrite_expr(pass, &let_.body)?;

    if var.same_as(&let_.var) && value.same_as(&let_.value) && body.same_as(&let_.body) {
        Ok(expr.clone())
    } else {
        Ok(ExprLet::new(var, value, body).into_ref())
    }
}

pub fn walk_if<P>(pass: &mut P, rw: &mut Rewriter, expr: &ExprRef, if_: &ExprIf) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let cond = rw.rewrite_expr(pass, &if_.cond)?;
    let then_branch = rw.rewrite_expr(pass, &if_.then_branch)?;
    let else_branch = rw.rewrite_expr(pass, &if_.else_branch)?;

    if cond.same_as(&if_.cond)
        && then_branch.same_as(&if_.then_branch)
        && else_branch.same_as(&if_.else_branch)
    {
        Ok(expr.clone())
    } else {
        Ok(ExprIf::new(cond, then_branch, else_branch).into_ref())
    }
}

pub fn walk_tuple_get<P>(
    pass: &mut P,
    rw: &mut Rewriter,
    expr: &ExprRef,
    get: &ExprTupleGet,
) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let tuple = rw.rewrite_expr(pass, &get.tuple)?;
    if tuple.same_as(&get.tuple) {
        Ok(expr.clone())
    } else {
        Ok(ExprTupleGet::new(tuple, get.index).into_ref())
    }
}

/// Rewrite a binder-position child. The result must still be a variable;
/// anything else is a contract violation by the active pass.
fn rewrite_binder<P>(pass: &mut P, rw: &mut Rewriter, binder: &ExprRef) -> Result<ExprRef>
where
    P: RewritePass + ?Sized,
{
    let new_binder = rw.rewrite_expr(pass, binder)?;
    if !new_binder.is_var() {
        return Err(Error::BinderExpected {
            found: new_binder.kind_name(),
        });
    }
    Ok(new_binder)
}

fn all_same<N: SharedNode>(new: &[N], old: &[N]) -> bool {
    izip!(new, old).all(|(a, b)| a.same_as(b))
}
