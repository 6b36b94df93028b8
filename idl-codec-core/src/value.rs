//! The in-memory value tree produced by decoding and consumed by encoding.

use std::fmt;

use crate::pubkey::Pubkey;

/// A decoded value, or a value to be encoded.
///
/// `List` stands for both `Vec` and fixed-size arrays; the descriptor
/// decides whether a length prefix is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    /// Floats compare with IEEE semantics, so a NaN never equals itself even
    /// though its bits survive encode and decode unchanged.
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    PublicKey(Pubkey),
    List(Vec<Value>),
    Option(Option<Box<Value>>),
    Struct(Fields),
    Enum { variant: String, fields: Fields },
}

impl Value {
    pub fn some(value: impl Into<Value>) -> Self {
        Value::Option(Some(Box::new(value.into())))
    }

    pub fn none() -> Self {
        Value::Option(None)
    }

    /// An enum value carrying fields.
    pub fn variant(name: impl Into<String>, fields: Fields) -> Self {
        Value::Enum {
            variant: name.into(),
            fields,
        }
    }

    /// An enum value without fields.
    pub fn unit(name: impl Into<String>) -> Self {
        Value::variant(name, Fields::new())
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the value's shape, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::I128(_) => "i128",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::PublicKey(_) => "publicKey",
            Value::List(_) => "list",
            Value::Option(_) => "option",
            Value::Struct(_) => "struct",
            Value::Enum { .. } => "enum",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any unsigned integer of at most 64 bits, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(v) => Some(u64::from(*v)),
            Value::U16(v) => Some(u64::from(*v)),
            Value::U32(v) => Some(u64::from(*v)),
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any signed integer of at most 64 bits, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_pubkey(&self) -> Option<&Pubkey> {
        match self {
            Value::PublicKey(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// `Some(None)` for an absent option, `None` when not an option.
    pub fn as_option(&self) -> Option<Option<&Value>> {
        match self {
            Value::Option(inner) => Some(inner.as_deref()),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Fields> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<(&str, &Fields)> {
        match self {
            Value::Enum { variant, fields } => Some((variant, fields)),
            _ => None,
        }
    }

    /// Field lookup on a struct value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct().and_then(|fields| fields.get(name))
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<u8> => Bytes,
    Pubkey => PublicKey,
    Fields => Struct,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::Option(v.map(|inner| Box::new(inner.into())))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::U128(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::I128(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "0x{}", crate::hex::encode(b)),
            Value::PublicKey(k) => write!(f, "{k}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Option(None) => f.write_str("None"),
            Value::Option(Some(inner)) => write!(f, "Some({inner})"),
            Value::Struct(fields) => write!(f, "{fields}"),
            Value::Enum { variant, fields } if fields.is_empty() => f.write_str(variant),
            Value::Enum { variant, fields } => write!(f, "{variant} {fields}"),
        }
    }
}

/// Ordered named fields of a struct, enum variant or argument list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field. New fields keep insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str(" }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_order_and_replace() {
        let mut fields = Fields::new().with("b", 1u8).with("a", 2u8);
        fields.insert("b", 3u8);
        let names: Vec<_> = fields.names().collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(fields.get("b"), Some(&Value::U8(3)));
    }

    #[test]
    fn display_is_readable() {
        let value = Value::Struct(
            Fields::new()
                .with("amount", 42u32)
                .with("memo", Value::some("hi"))
                .with("kind", Value::unit("Fast"))
                .with("raw", vec![0xabu8, 0x01]),
        );
        assert_eq!(
            value.to_string(),
            r#"{ amount: 42, memo: Some("hi"), kind: Fast, raw: 0xab01 }"#
        );
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(Some(5u16)), Value::some(5u16));
        assert_eq!(Value::from(None::<u16>), Value::none());
    }
}
