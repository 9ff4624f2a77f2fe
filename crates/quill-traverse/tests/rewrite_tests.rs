// Rewriter engine tests: identity preservation, sharing preservation,
// memoization, binder contract, type hook, error propagation.

use pretty_assertions::assert_eq;
use quill_core::ast::*;
use quill_core::error::{Error, Result};
use quill_traverse::rewrite::{rewrite, walk_tuple, walk_var, RewritePass, Rewriter};
use quill_traverse::NoopPass;

/// Replaces every variable with the given name by a fixed expression.
struct SubstVar {
    name: &'static str,
    replacement: ExprRef,
}

impl RewritePass for SubstVar {
    fn name(&self) -> &str {
        "subst-var"
    }

    fn rewrite_var(&mut self, rw: &mut Rewriter, expr: &ExprRef, var: &ExprVar) -> Result<ExprRef> {
        if var.name.as_str() == self.name {
            return Ok(self.replacement.clone());
        }
        walk_var(self, rw, expr, var)
    }
}

/// Counts how often each overridden handler actually runs.
#[derive(Default)]
struct CountingPass {
    constants: usize,
    tuples: usize,
}

impl RewritePass for CountingPass {
    fn name(&self) -> &str {
        "counting"
    }

    fn rewrite_constant(
        &mut self,
        _rw: &mut Rewriter,
        expr: &ExprRef,
        _constant: &ExprConstant,
    ) -> Result<ExprRef> {
        self.constants += 1;
        Ok(expr.clone())
    }

    fn rewrite_tuple(
        &mut self,
        rw: &mut Rewriter,
        expr: &ExprRef,
        tuple: &ExprTuple,
    ) -> Result<ExprRef> {
        self.tuples += 1;
        walk_tuple(self, rw, expr, tuple)
    }
}

/// Rewrites every constant into a fresh node carrying the same payload.
struct RefreshConstants;

impl RewritePass for RefreshConstants {
    fn name(&self) -> &str {
        "refresh-constants"
    }

    fn rewrite_constant(
        &mut self,
        _rw: &mut Rewriter,
        _expr: &ExprRef,
        constant: &ExprConstant,
    ) -> Result<ExprRef> {
        Ok(Expr::constant(constant.value.clone()))
    }
}

/// Turns every variable into a constant; violates the binder contract.
struct ConstifyVars;

impl RewritePass for ConstifyVars {
    fn name(&self) -> &str {
        "constify-vars"
    }

    fn rewrite_var(
        &mut self,
        _rw: &mut Rewriter,
        _expr: &ExprRef,
        _var: &ExprVar,
    ) -> Result<ExprRef> {
        Ok(Expr::constant(Value::int(0)))
    }
}

/// Fails on every global reference.
struct FailOnGlobal;

impl RewritePass for FailOnGlobal {
    fn name(&self) -> &str {
        "fail-on-global"
    }

    fn rewrite_global(
        &mut self,
        _rw: &mut Rewriter,
        _expr: &ExprRef,
        global: &ExprGlobal,
    ) -> Result<ExprRef> {
        quill_core::bail!("unexpected global reference {}", global.name)
    }
}

/// Resolves the `T` type variable to int through the type hook.
struct ResolveT;

impl RewritePass for ResolveT {
    fn name(&self) -> &str {
        "resolve-t"
    }

    fn rewrite_ty(&mut self, _rw: &mut Rewriter, ty: &TyRef) -> Result<TyRef> {
        match ty.as_ref() {
            Ty::Var(v) if v.name.as_str() == "T" => Ok(Ty::primitive(TypePrimitive::Int)),
            _ => Ok(ty.clone()),
        }
    }
}

/// Records the order in which leaf handlers run.
#[derive(Default)]
struct RecordingRewrite {
    events: Vec<String>,
}

impl RewritePass for RecordingRewrite {
    fn name(&self) -> &str {
        "recording"
    }

    fn rewrite_var(&mut self, rw: &mut Rewriter, expr: &ExprRef, var: &ExprVar) -> Result<ExprRef> {
        self.events.push(format!("var {}", var.name));
        walk_var(self, rw, expr, var)
    }

    fn rewrite_constant(
        &mut self,
        _rw: &mut Rewriter,
        expr: &ExprRef,
        constant: &ExprConstant,
    ) -> Result<ExprRef> {
        self.events.push(format!("const {}", constant.value));
        Ok(expr.clone())
    }
}

#[test]
fn test_noop_rewrite_preserves_identity() -> Result<()> {
    let shared = Expr::invoke(
        Expr::primitive("add"),
        vec![],
        vec![Expr::var("x"), Expr::constant(Value::int(5))],
    );
    let root = Expr::if_else(
        Expr::constant(Value::bool(true)),
        shared.clone(),
        Expr::tuple_get(Expr::tuple(vec![shared.clone()]), 0),
    );

    let rewritten = rewrite(&mut NoopPass, &root)?;
    assert!(rewritten.same_as(&root));

    Ok(())
}

#[test]
fn test_rewrite_replaces_variable_in_call() -> Result<()> {
    let op = Expr::primitive("add");
    let five = Expr::constant(Value::int(5));
    let attrs = vec![Attribute::name("pure")];
    let call =
        ExprInvoke::new(op.clone(), vec![], vec![Expr::var("x"), five.clone()], attrs.clone())
            .into_ref();

    let mut pass = SubstVar {
        name: "x",
        replacement: Expr::constant(Value::int(1)),
    };
    let rewritten = rewrite(&mut pass, &call)?;

    assert!(!rewritten.same_as(&call));
    let invoke = match rewritten.as_ref() {
        Expr::Invoke(invoke) => invoke,
        other => panic!("expected invoke, got {}", other.kind_name()),
    };
    assert!(invoke.callee.same_as(&op));
    assert_eq!(invoke.args.len(), 2);
    assert_eq!(invoke.args[0], Expr::constant(Value::int(1)));
    assert!(invoke.args[1].same_as(&five));
    assert_eq!(invoke.attrs, attrs);

    Ok(())
}

#[test]
fn test_sharing_is_preserved() -> Result<()> {
    let shared = Expr::tuple(vec![Expr::var("x")]);
    let root = Expr::tuple(vec![
        Expr::tuple_get(shared.clone(), 0),
        Expr::tuple_get(shared.clone(), 0),
    ]);

    let mut pass = SubstVar {
        name: "x",
        replacement: Expr::constant(Value::int(1)),
    };
    let rewritten = rewrite(&mut pass, &root)?;

    let fields = match rewritten.as_ref() {
        Expr::Tuple(t) => &t.fields,
        other => panic!("expected tuple, got {}", other.kind_name()),
    };
    let (a, b) = match (fields[0].as_ref(), fields[1].as_ref()) {
        (Expr::TupleGet(a), Expr::TupleGet(b)) => (a, b),
        _ => panic!("expected tuple projections"),
    };
    // The shared child changed, but both parents still point at one node.
    assert!(!a.tuple.same_as(&shared));
    assert!(a.tuple.same_as(&b.tuple));

    Ok(())
}

#[test]
fn test_handler_runs_once_per_identity() -> Result<()> {
    let c = Expr::constant(Value::int(7));
    let root = Expr::tuple(vec![c.clone(), c.clone(), c.clone()]);

    let mut pass = CountingPass::default();
    let rewritten = rewrite(&mut pass, &root)?;

    assert_eq!(pass.constants, 1);
    assert_eq!(pass.tuples, 1);
    assert!(rewritten.same_as(&root));

    Ok(())
}

#[test]
fn test_memo_reuses_rewritten_results() -> Result<()> {
    let c = Expr::constant(Value::int(7));
    let root = Expr::tuple(vec![c.clone(), c.clone()]);

    let rewritten = rewrite(&mut RefreshConstants, &root)?;

    let fields = match rewritten.as_ref() {
        Expr::Tuple(t) => &t.fields,
        other => panic!("expected tuple, got {}", other.kind_name()),
    };
    assert!(!fields[0].same_as(&c));
    assert!(fields[0].same_as(&fields[1]));

    Ok(())
}

#[test]
fn test_only_changed_spine_is_rebuilt() -> Result<()> {
    let keep = Expr::tuple(vec![Expr::constant(Value::int(1))]);
    let change = Expr::tuple(vec![Expr::var("x")]);
    let root = Expr::tuple(vec![keep.clone(), change.clone()]);

    let mut pass = SubstVar {
        name: "x",
        replacement: Expr::constant(Value::int(2)),
    };
    let rewritten = rewrite(&mut pass, &root)?;

    assert!(!rewritten.same_as(&root));
    let fields = match rewritten.as_ref() {
        Expr::Tuple(t) => &t.fields,
        other => panic!("expected tuple, got {}", other.kind_name()),
    };
    assert!(fields[0].same_as(&keep));
    assert!(!fields[1].same_as(&change));

    Ok(())
}

#[test]
fn test_let_binder_must_stay_variable() {
    let root = Expr::let_in(
        Expr::var("x"),
        Expr::constant(Value::int(1)),
        Expr::constant(Value::int(2)),
    );

    let err = rewrite(&mut ConstifyVars, &root).unwrap_err();
    assert!(matches!(err, Error::BinderExpected { found: "constant" }));
}

#[test]
fn test_function_binder_must_stay_variable() {
    let func = ExprFunction::new(
        vec![],
        vec![Expr::var("x")],
        Ty::unit(),
        Expr::constant(Value::int(1)),
        vec![],
    )
    .into_ref();

    let err = rewrite(&mut ConstifyVars, &func).unwrap_err();
    assert!(matches!(err, Error::BinderExpected { .. }));
}

#[test]
fn test_type_hook_rewrites_annotations() -> Result<()> {
    let t = Ty::var("T");
    let body = Expr::var("y");
    let func = ExprFunction::new(
        vec![t.clone()],
        vec![Expr::var_with_ty("x", t.clone())],
        t.clone(),
        body.clone(),
        vec![],
    )
    .into_ref();

    let rewritten = rewrite(&mut ResolveT, &func)?;

    let new_func = match rewritten.as_ref() {
        Expr::Function(f) => f,
        other => panic!("expected function, got {}", other.kind_name()),
    };
    let int = Ty::primitive(TypePrimitive::Int);
    assert_eq!(new_func.ty_params[0], int);
    assert_eq!(new_func.ret_ty, int);
    let new_param = new_func.params[0].as_var().unwrap();
    assert_eq!(new_param.ty.clone().unwrap(), int);
    // The body variable has no annotation, so it keeps its identity.
    assert!(new_func.body.same_as(&body));

    Ok(())
}

#[test]
fn test_unannotated_var_is_never_rebuilt() -> Result<()> {
    let v = Expr::var("x");
    let rewritten = rewrite(&mut ResolveT, &v)?;
    assert!(rewritten.same_as(&v));

    Ok(())
}

#[test]
fn test_let_rewrites_binder_before_value() -> Result<()> {
    let root = Expr::let_in(
        Expr::var("x"),
        Expr::constant(Value::int(1)),
        Expr::constant(Value::int(2)),
    );

    let mut pass = RecordingRewrite::default();
    rewrite(&mut pass, &root)?;

    assert_eq!(pass.events, ["var x", "const 1", "const 2"]);

    Ok(())
}

#[test]
fn test_handler_errors_propagate() {
    let root = Expr::tuple(vec![Expr::global("main")]);

    let err = rewrite(&mut FailOnGlobal, &root).unwrap_err();
    assert!(err.to_string().contains("unexpected global reference main"));
}

#[test]
fn test_shared_dag_costs_linear_work() -> Result<()> {
    // 40 doubling levels: 2^40 paths to the leaf, 41 unique nodes.
    let mut node = Expr::constant(Value::int(0));
    for _ in 0..40 {
        node = Expr::tuple(vec![node.clone(), node.clone()]);
    }

    let mut pass = CountingPass::default();
    let rewritten = rewrite(&mut pass, &node)?;

    assert_eq!(pass.tuples, 40);
    assert_eq!(pass.constants, 1);
    assert!(rewritten.same_as(&node));

    Ok(())
}

#[test]
fn test_deep_let_chain_terminates() -> Result<()> {
    let mut body = Expr::constant(Value::int(0));
    for i in 0..500i64 {
        body = Expr::let_in(
            Expr::var(format!("x{i}")),
            Expr::constant(Value::int(i)),
            body,
        );
    }

    let rewritten = rewrite(&mut NoopPass, &body)?;
    assert!(rewritten.same_as(&body));

    Ok(())
}
