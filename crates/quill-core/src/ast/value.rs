use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::common_enum;
use crate::utils::to_json::ToJson;

/// wrap a constant payload with derive Debug, Clone, Serialize, Deserialize,
/// PartialEq, Eq, Hash, PartialOrd, Ord
macro_rules! plain_value {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name;
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", stringify!($name))
            }
        }
    };
    (no_ord $(#[$attr:meta])* $name:ident: $ty:ty) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name {
            pub value: $ty,
        }
        impl $name {
            pub fn new(v: $ty) -> Self {
                Self { value: v }
            }
        }
        impl ToJson for $name {
            fn to_json(&self) -> crate::error::Result<serde_json::Value> {
                Ok(json!(self.value))
            }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.value)
            }
        }
    };
    ($(#[$attr:meta])* $name:ident: $ty:ty) => {
        plain_value!(no_ord $(#[$attr])* #[derive(PartialOrd, Ord)] $name: $ty);
    };
}

plain_value! {
    ValueInt: i64
}
plain_value! {
    ValueBool: bool
}
plain_value! {
    ValueUnit
}

/// An opaque embedded data blob. The traversal core never looks inside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueBytes {
    pub value: Bytes,
}

impl ValueBytes {
    pub fn new(v: impl Into<Bytes>) -> Self {
        Self { value: v.into() }
    }
}

impl ToJson for ValueBytes {
    fn to_json(&self) -> crate::error::Result<serde_json::Value> {
        Ok(json!(self.value.as_ref()))
    }
}

impl Display for ValueBytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "bytes[{}]", self.value.len())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDecimal {
    pub value: f64,
}

impl ValueDecimal {
    pub fn new(v: f64) -> Self {
        Self { value: v }
    }
}

impl PartialEq for ValueDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.value.total_cmp(&other.value) == std::cmp::Ordering::Equal
    }
}

impl Eq for ValueDecimal {}

impl PartialOrd for ValueDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.value.total_cmp(&other.value))
    }
}

impl Ord for ValueDecimal {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl Hash for ValueDecimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}

impl ToJson for ValueDecimal {
    fn to_json(&self) -> crate::error::Result<serde_json::Value> {
        Ok(json!(self.value))
    }
}

impl Display for ValueDecimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

common_enum! {
    #[derive(derive_more::From)]
    pub enum Value {
        Int(ValueInt),
        Bool(ValueBool),
        Decimal(ValueDecimal),
        Bytes(ValueBytes),
        Unit(ValueUnit),
    }
}

impl Value {
    pub fn int(v: i64) -> Value {
        ValueInt::new(v).into()
    }

    pub fn bool(v: bool) -> Value {
        ValueBool::new(v).into()
    }

    pub fn decimal(v: f64) -> Value {
        ValueDecimal::new(v).into()
    }

    pub fn bytes(v: impl Into<Bytes>) -> Value {
        ValueBytes::new(v).into()
    }

    pub fn unit() -> Value {
        Value::Unit(ValueUnit)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit(_))
    }
}

impl ToJson for Value {
    fn to_json(&self) -> crate::error::Result<serde_json::Value> {
        match self {
            Value::Int(v) => v.to_json(),
            Value::Bool(v) => v.to_json(),
            Value::Decimal(v) => v.to_json(),
            Value::Bytes(v) => v.to_json(),
            Value::Unit(_) => Ok(serde_json::Value::Null),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => Display::fmt(v, f),
            Value::Bool(v) => Display::fmt(v, f),
            Value::Decimal(v) => Display::fmt(v, f),
            Value::Bytes(v) => Display::fmt(v, f),
            Value::Unit(_) => write!(f, "()"),
        }
    }
}
