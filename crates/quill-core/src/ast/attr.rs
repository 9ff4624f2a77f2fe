use crate::ast::{Ident, Value};
use crate::{common_enum, common_struct};

common_enum! {
    #[derive(derive_more::From)]
    pub enum AttrMeta {
        Name(Ident),
        NameValue(AttrMetaNameValue),
    }
}

common_struct! {
    pub struct AttrMetaNameValue {
        pub name: Ident,
        pub value: Value,
    }
}

common_struct! {
    /// One entry of the opaque attribute bag carried by functions and calls.
    /// The traversal engines pass these through untouched.
    pub struct Attribute {
        pub meta: AttrMeta,
    }
}

impl Attribute {
    pub fn name(name: impl Into<Ident>) -> Self {
        Self {
            meta: AttrMeta::Name(name.into()),
        }
    }

    pub fn name_value(name: impl Into<Ident>, value: Value) -> Self {
        Self {
            meta: AttrMeta::NameValue(AttrMetaNameValue {
                name: name.into(),
                value,
            }),
        }
    }
}

pub trait AttributesExt {
    fn find_by_name(&self, name: &str) -> Option<&AttrMeta>;
}

impl AttributesExt for Vec<Attribute> {
    fn find_by_name(&self, name: &str) -> Option<&AttrMeta> {
        self.iter()
            .find(|x| match &x.meta {
                AttrMeta::Name(n) => n.as_str() == name,
                AttrMeta::NameValue(nv) => nv.name.as_str() == name,
            })
            .map(|x| &x.meta)
    }
}
