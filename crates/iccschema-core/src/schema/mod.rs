//! Declarative field layouts
//!
//! A [`SchemaDefinition`] is an ordered list of [`FieldSpec`]s decoded back
//! to back. Definitions are validated when they are built, so the decoder
//! never meets an unknown type, a forward length reference, or a
//! `remaining` length anywhere but the last field.

mod loader;
mod registry;

pub use loader::{RawField, RawSchemaEntry};
pub use registry::{SchemaEntry, SchemaRegistry};

use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};

/// Where a variable-length field gets its length
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthSource {
    /// Everything left in the tag after the preceding fields
    Remaining,
    /// Decoded value of an earlier unsigned field
    Field(String),
    /// Declared constant length (zero when no length is given)
    Fixed(usize),
}

/// Closed set of field encodings
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    U8,
    U16,
    U32,
    /// 16.16 signed fixed point
    S15Fixed16,
    /// Single-byte text
    String(LengthSource),
    /// Raw bytes borrowed from the source buffer
    Bytes(LengthSource),
    /// 4-byte unsigned value annotated with a label
    Enum(BTreeMap<u32, String>),
    /// 4-byte unsigned value annotated with the labels of its set bits
    Bitflags(BTreeMap<u32, String>),
}

impl FieldType {
    /// Bytes consumed, if independent of the data
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::U8 => Some(1),
            Self::U16 => Some(2),
            Self::U32 | Self::S15Fixed16 | Self::Enum(_) | Self::Bitflags(_) => Some(4),
            Self::String(LengthSource::Fixed(n)) | Self::Bytes(LengthSource::Fixed(n)) => Some(*n),
            Self::String(_) | Self::Bytes(_) => None,
        }
    }

    fn length_source(&self) -> Option<&LengthSource> {
        match self {
            Self::String(src) | Self::Bytes(src) => Some(src),
            _ => None,
        }
    }

    fn is_plain_unsigned(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32)
    }
}

/// One named field of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A validated, named field layout
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    name: String,
    fields: Vec<FieldSpec>,
}

impl SchemaDefinition {
    /// Build and validate a definition
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self> {
        let name = name.into();
        validate(&name, &fields)?;
        Ok(Self { name, fields })
    }

    /// Schema identity, used for post-processor dispatch
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Total size when every field has a fixed width
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().map(|f| f.ty.fixed_width()).sum()
    }
}

fn validate(schema: &str, fields: &[FieldSpec]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        if !seen.insert(field.name.as_str()) {
            return Err(Error::invalid_schema(
                schema,
                format!("duplicate field '{}'", field.name),
            ));
        }

        if let FieldType::Bitflags(labels) = &field.ty {
            if let Some(bit) = labels.keys().find(|&&bit| bit >= 32) {
                return Err(Error::invalid_schema(
                    schema,
                    format!("field '{}': bit index {} exceeds u32", field.name, bit),
                ));
            }
        }

        match (&field.ty, field.ty.length_source()) {
            (_, Some(LengthSource::Remaining)) if index + 1 != fields.len() => {
                return Err(Error::invalid_schema(
                    schema,
                    format!("field '{}': 'remaining' is only valid on the last field", field.name),
                ));
            }
            (FieldType::Bytes(_), Some(LengthSource::Field(source))) => {
                return Err(Error::invalid_schema(
                    schema,
                    format!(
                        "field '{}': bytes cannot take their length from field '{}'",
                        field.name, source
                    ),
                ));
            }
            (_, Some(LengthSource::Field(source))) => {
                let earlier = fields[..index].iter().find(|f| &f.name == source);
                match earlier {
                    Some(f) if f.ty.is_plain_unsigned() => {}
                    Some(_) => {
                        return Err(Error::invalid_schema(
                            schema,
                            format!(
                                "field '{}': length field '{}' is not an unsigned integer",
                                field.name, source
                            ),
                        ));
                    }
                    None => {
                        return Err(Error::invalid_schema(
                            schema,
                            format!(
                                "field '{}': length field '{}' is not declared before it",
                                field.name, source
                            ),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}
