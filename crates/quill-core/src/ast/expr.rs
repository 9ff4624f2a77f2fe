use std::sync::Arc;

use crate::ast::{Attribute, Ident, TyRef, TySlot, Value};
use crate::{common_enum, common_struct};

pub type ExprRef = Arc<Expr>;

common_enum! {
    #[derive(derive_more::From)]
    /// Expr is an expression node of the quill IR.
    ///
    /// The variant set is closed: both traversal engines match on it
    /// exhaustively, so a new variant cannot be added without teaching the
    /// engines about its shape first.
    pub enum Expr {
        Var(ExprVar),
        Constant(ExprConstant),
        Global(ExprGlobal),
        Primitive(ExprPrimitive),
        Tuple(ExprTuple),
        Function(ExprFunction),
        Invoke(ExprInvoke),
        Let(ExprLet),
        If(ExprIf),
        TupleGet(ExprTupleGet),
    }
}

common_struct! {
    /// A named variable, optionally annotated with its type.
    pub struct ExprVar {
        pub name: Ident,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: TySlot,
    }
}

impl ExprVar {
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            ty: None,
        }
    }

    pub fn with_ty(name: impl Into<Ident>, ty: TyRef) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
        }
    }
}

common_struct! {
    /// A literal. The payload is opaque to the traversal engines.
    pub struct ExprConstant {
        pub value: Value,
    }
}

impl ExprConstant {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

common_struct! {
    /// A symbolic reference to a top-level definition.
    pub struct ExprGlobal {
        pub name: Ident,
    }
}

common_struct! {
    /// A reference to a built-in operator.
    pub struct ExprPrimitive {
        pub name: Ident,
    }
}

common_struct! {
    pub struct ExprTuple {
        pub fields: Vec<ExprRef>,
    }
}

impl ExprTuple {
    pub fn new(fields: Vec<ExprRef>) -> Self {
        Self { fields }
    }
}

common_struct! {
    /// An anonymous function. `ty_params` are type-parameter binders and
    /// `params` are value-parameter binders; every element of `params` must
    /// hold a `Var`. `attrs` is an opaque bag the engines carry through.
    pub struct ExprFunction {
        pub ty_params: Vec<TyRef>,
        pub params: Vec<ExprRef>,
        pub ret_ty: TyRef,
        pub body: ExprRef,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub attrs: Vec<Attribute>,
    }
}

impl ExprFunction {
    pub fn new(
        ty_params: Vec<TyRef>,
        params: Vec<ExprRef>,
        ret_ty: TyRef,
        body: ExprRef,
        attrs: Vec<Attribute>,
    ) -> Self {
        Self {
            ty_params,
            params,
            ret_ty,
            body,
            attrs,
        }
    }
}

common_struct! {
    /// Application of `callee` to type and value arguments.
    pub struct ExprInvoke {
        pub callee: ExprRef,
        pub ty_args: Vec<TyRef>,
        pub args: Vec<ExprRef>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub attrs: Vec<Attribute>,
    }
}

impl ExprInvoke {
    pub fn new(
        callee: ExprRef,
        ty_args: Vec<TyRef>,
        args: Vec<ExprRef>,
        attrs: Vec<Attribute>,
    ) -> Self {
        Self {
            callee,
            ty_args,
            args,
            attrs,
        }
    }
}

common_struct! {
    /// `let var = value in body`. `var` must hold a `Var`.
    pub struct ExprLet {
        pub var: ExprRef,
        pub value: ExprRef,
        pub body: ExprRef,
    }
}

impl ExprLet {
    pub fn new(var: ExprRef, value: ExprRef, body: ExprRef) -> Self {
        Self { var, value, body }
    }
}

common_struct! {
    pub struct ExprIf {
        pub cond: ExprRef,
        pub then_branch: ExprRef,
        pub else_branch: ExprRef,
    }
}

impl ExprIf {
    pub fn new(cond: ExprRef, then_branch: ExprRef, else_branch: ExprRef) -> Self {
        Self {
            cond,
            then_branch,
            else_branch,
        }
    }
}

common_struct! {
    /// Projection of one field out of a tuple-valued expression.
    pub struct ExprTupleGet {
        pub tuple: ExprRef,
        pub index: usize,
    }
}

impl ExprTupleGet {
    pub fn new(tuple: ExprRef, index: usize) -> Self {
        Self { tuple, index }
    }
}

impl Expr {
    pub fn var(name: impl Into<Ident>) -> ExprRef {
        ExprVar::new(name).into_ref()
    }

    pub fn var_with_ty(name: impl Into<Ident>, ty: TyRef) -> ExprRef {
        ExprVar::with_ty(name, ty).into_ref()
    }

    pub fn constant(value: Value) -> ExprRef {
        ExprConstant::new(value).into_ref()
    }

    pub fn global(name: impl Into<Ident>) -> ExprRef {
        ExprGlobal { name: name.into() }.into_ref()
    }

    pub fn primitive(name: impl Into<Ident>) -> ExprRef {
        ExprPrimitive { name: name.into() }.into_ref()
    }

    pub fn tuple(fields: Vec<ExprRef>) -> ExprRef {
        ExprTuple::new(fields).into_ref()
    }

    pub fn invoke(callee: ExprRef, ty_args: Vec<TyRef>, args: Vec<ExprRef>) -> ExprRef {
        ExprInvoke::new(callee, ty_args, args, Vec::new()).into_ref()
    }

    pub fn let_in(var: ExprRef, value: ExprRef, body: ExprRef) -> ExprRef {
        ExprLet::new(var, value, body).into_ref()
    }

    pub fn if_else(cond: ExprRef, then_branch: ExprRef, else_branch: ExprRef) -> ExprRef {
        ExprIf::new(cond, then_branch, else_branch).into_ref()
    }

    pub fn tuple_get(tuple: ExprRef, index: usize) -> ExprRef {
        ExprTupleGet::new(tuple, index).into_ref()
    }

    /// Human-readable variant name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Var(_) => "variable",
            Expr::Constant(_) => "constant",
            Expr::Global(_) => "global reference",
            Expr::Primitive(_) => "primitive",
            Expr::Tuple(_) => "tuple",
            Expr::Function(_) => "function",
            Expr::Invoke(_) => "invoke",
            Expr::Let(_) => "let",
            Expr::If(_) => "if",
            Expr::TupleGet(_) => "tuple projection",
        }
    }

    pub fn as_var(&self) -> Option<&ExprVar> {
        match self {
            Expr::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        self.as_var().is_some()
    }
}

/// Conversion seam for building shared expression nodes.
pub trait IntoExprRef {
    fn into_ref(self) -> ExprRef;
}

impl<T: Into<Expr>> IntoExprRef for T {
    fn into_ref(self) -> ExprRef {
        Arc::new(self.into())
    }
}
