//! Decoded values
//!
//! A [`DecodedRecord`] keeps fields in the order they were produced. Byte
//! fields borrow the buffer they were decoded from, so a record can never
//! outlive that buffer.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Unsigned integer (u8/u16/u32 fields)
    UInt(u32),
    /// Real number (s15Fixed16 fields)
    Real(f64),
    /// Text (string fields and derived display strings)
    Text(String),
    /// Integer annotated with enum or bitflag labels, e.g. `"2 (Saturation)"`
    Annotated { raw: u32, text: String },
    /// Raw bytes borrowed from the source buffer
    Bytes(&'a [u8]),
    /// Nested record
    Record(DecodedRecord<'a>),
    /// List of nested records
    List(Vec<DecodedRecord<'a>>),
}

impl<'a> Value<'a> {
    /// Numeric view of integer-like values
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt(v) | Value::Annotated { raw: v, .. } => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Annotated { text: s, .. } => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DecodedRecord<'a>]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::UInt(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(s) | Value::Annotated { text: s, .. } => f.write_str(s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Record(r) => write!(f, "{{{} fields}}", r.len()),
            Value::List(items) => write!(f, "[{} items]", items.len()),
        }
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::UInt(v) => serializer.serialize_u32(*v),
            Value::Real(v) => serializer.serialize_f64(*v),
            Value::Text(s) | Value::Annotated { text: s, .. } => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.collect_seq(b.iter()),
            Value::Record(r) => r.serialize(serializer),
            Value::List(items) => serializer.collect_seq(items),
        }
    }
}

/// Ordered, string-keyed decode result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord<'a> {
    fields: Vec<(String, Value<'a>)>,
    consumed: usize,
}

impl<'a> DecodedRecord<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
            consumed: 0,
        }
    }

    /// Bytes consumed by the field walk that produced this record
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub(crate) fn set_consumed(&mut self, consumed: usize) {
        self.consumed = consumed;
    }

    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(k, _)| k == name)
    }

    /// Set `name`, replacing in place or appending
    pub fn insert(&mut self, name: impl Into<String>, value: Value<'a>) {
        let name = name.into();
        match self.position(&name) {
            Some(i) => self.fields[i].1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Set `name` at `index`, replacing any existing entry of that name
    pub fn insert_at(&mut self, index: usize, name: impl Into<String>, value: Value<'a>) {
        let name = name.into();
        let index = match self.position(&name) {
            Some(i) => {
                self.fields.remove(i);
                if i < index { index - 1 } else { index }
            }
            None => index,
        };
        self.fields.insert(index.min(self.fields.len()), (name, value));
    }

    pub fn remove(&mut self, name: &str) -> Option<Value<'a>> {
        self.position(name).map(|i| self.fields.remove(i).1)
    }

    /// Index of `name` in field order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.position(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<'a>)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for DecodedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
