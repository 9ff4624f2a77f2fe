use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;

use crate::ast::Ident;
use crate::{common_enum, common_struct};

pub type TyRef = Arc<Ty>;

/// Shared slot for storing optional type annotations on IR nodes.
pub type TySlot = Option<TyRef>;

common_enum! {
    #[derive(derive_more::From)]
    /// The type-system collaborator's IR, seen here only at its interface.
    /// The expression engines never recurse into a `Ty`; every type-position
    /// child is routed through the `rewrite_ty` / `visit_ty` hook instead.
    pub enum Ty {
        Unit(TypeUnit),
        Primitive(TypePrimitive),
        Tuple(TypeTuple),
        Function(TypeFunction),
        Var(TypeVar),
    }
}

common_struct! {
    pub struct TypeUnit;
}

common_enum! {
    #[derive(Copy, Eq, PartialOrd, Ord)]
    pub enum TypePrimitive {
        Bool,
        Char,
        Int,
        Decimal,
    }
}

common_struct! {
    pub struct TypeTuple {
        pub fields: Vec<TyRef>,
    }
}

common_struct! {
    pub struct TypeFunction {
        pub params: Vec<TyRef>,
        pub ret: TyRef,
    }
}

common_struct! {
    /// A type parameter, e.g. the `T` bound by a generic function.
    pub struct TypeVar {
        pub name: Ident,
    }
}

impl Ty {
    pub fn unit() -> TyRef {
        TypeUnit.into_ref()
    }

    pub fn primitive(p: TypePrimitive) -> TyRef {
        p.into_ref()
    }

    pub fn tuple(fields: Vec<TyRef>) -> TyRef {
        TypeTuple { fields }.into_ref()
    }

    pub fn function(params: Vec<TyRef>, ret: TyRef) -> TyRef {
        TypeFunction { params, ret }.into_ref()
    }

    pub fn var(name: impl Into<Ident>) -> TyRef {
        TypeVar { name: name.into() }.into_ref()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Ty::Unit(_) => "unit type",
            Ty::Primitive(_) => "primitive type",
            Ty::Tuple(_) => "tuple type",
            Ty::Function(_) => "function type",
            Ty::Var(_) => "type variable",
        }
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Unit(_) => write!(f, "()"),
            Ty::Primitive(p) => Display::fmt(p, f),
            Ty::Tuple(t) => {
                write!(f, "({})", t.fields.iter().map(|x| x.to_string()).join(", "))
            }
            Ty::Function(t) => write!(
                f,
                "fn({}) -> {}",
                t.params.iter().map(|x| x.to_string()).join(", "),
                t.ret
            ),
            Ty::Var(v) => write!(f, "{}", v.name),
        }
    }
}

impl Display for TypePrimitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypePrimitive::Bool => "bool",
            TypePrimitive::Char => "char",
            TypePrimitive::Int => "int",
            TypePrimitive::Decimal => "decimal",
        };
        write!(f, "{}", s)
    }
}

/// Conversion seam for building shared type nodes.
pub trait IntoTyRef {
    fn into_ref(self) -> TyRef;
}

impl<T: Into<Ty>> IntoTyRef for T {
    fn into_ref(self) -> TyRef {
        Arc::new(self.into())
    }
}
