//! Declarative schema tables
//!
//! Tables are JSON objects keyed by tag signature, type signature or a
//! logical type name. Each value is either a definition or a `$ref` alias:
//!
//! ```json
//! {
//!   "sf32": { "$ref": "matrix3x3Type" },
//!   "matrix3x3Type": {
//!     "name": "matrix3x3Type",
//!     "fields": [
//!       { "name": "typeSignature", "type": "string", "length": 4 },
//!       { "name": "e00", "type": "s15Fixed16" }
//!     ]
//!   }
//! }
//! ```
//!
//! Field type strings are converted to [`FieldType`] here, so anything the
//! decoder cannot handle is rejected while loading.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{FieldSpec, FieldType, LengthSource, SchemaDefinition, SchemaEntry};
use crate::error::{Error, Result};

/// Length sentinel meaning "rest of the tag"
const REMAINING: &str = "remaining";

/// A table entry as written in JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSchemaEntry {
    Alias {
        #[serde(rename = "$ref")]
        target: String,
    },
    Definition {
        name: String,
        fields: Vec<RawField>,
    },
}

/// A field as written in JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitflags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_field: Option<String>,
}

impl RawField {
    fn into_spec(self, schema: &str) -> Result<FieldSpec> {
        let RawField {
            name,
            ty,
            enum_labels,
            bitflags,
            length,
            length_field,
        } = self;

        let has_length = length.is_some() || length_field.is_some();
        let length_source = match length_field {
            Some(field) if field == REMAINING => LengthSource::Remaining,
            Some(field) => LengthSource::Field(field),
            None => LengthSource::Fixed(length.unwrap_or(0)),
        };

        let field_type = match (enum_labels, bitflags) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid_schema(
                    schema,
                    format!("field '{}': enum and bitflags are exclusive", name),
                ));
            }
            (Some(labels), None) => {
                if !matches!(ty.as_str(), "u8" | "u16" | "u32") {
                    return Err(Error::invalid_schema(
                        schema,
                        format!("field '{}': enum requires an unsigned type, got '{}'", name, ty),
                    ));
                }
                FieldType::Enum(parse_labels(schema, &name, labels)?)
            }
            (None, Some(labels)) => {
                if ty != "u32" {
                    return Err(Error::invalid_schema(
                        schema,
                        format!("field '{}': bitflags require u32, got '{}'", name, ty),
                    ));
                }
                FieldType::Bitflags(parse_labels(schema, &name, labels)?)
            }
            (None, None) => match ty.as_str() {
                "u8" => FieldType::U8,
                "u16" => FieldType::U16,
                "u32" => FieldType::U32,
                "s15Fixed16" => FieldType::S15Fixed16,
                "string" => FieldType::String(length_source),
                "bytes" => FieldType::Bytes(length_source),
                other => {
                    return Err(Error::invalid_schema(
                        schema,
                        format!("field '{}': unknown type '{}'", name, other),
                    ));
                }
            },
        };

        if has_length && !matches!(field_type, FieldType::String(_) | FieldType::Bytes(_)) {
            return Err(Error::invalid_schema(
                schema,
                format!("field '{}': length only applies to string and bytes, got '{}'", name, ty),
            ));
        }

        Ok(FieldSpec::new(name, field_type))
    }
}

fn parse_labels(
    schema: &str,
    field: &str,
    labels: BTreeMap<String, String>,
) -> Result<BTreeMap<u32, String>> {
    labels
        .into_iter()
        .map(|(key, label)| {
            key.trim().parse::<u32>().map(|k| (k, label)).map_err(|_| {
                Error::invalid_schema(
                    schema,
                    format!("field '{}': label key '{}' is not an integer", field, key),
                )
            })
        })
        .collect()
}

impl RawSchemaEntry {
    pub(crate) fn into_entry(self) -> Result<SchemaEntry> {
        match self {
            Self::Alias { target } => Ok(SchemaEntry::Alias(target)),
            Self::Definition { name, fields } => {
                let fields = fields
                    .into_iter()
                    .map(|f| f.into_spec(&name))
                    .collect::<Result<Vec<_>>>()?;
                Ok(SchemaEntry::Definition(Arc::new(SchemaDefinition::new(
                    name, fields,
                )?)))
            }
        }
    }
}

/// Parse a whole table into registry entries
pub(crate) fn parse_table(json: &str) -> Result<Vec<(String, SchemaEntry)>> {
    let raw: BTreeMap<String, RawSchemaEntry> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|(key, entry)| Ok((key, entry.into_entry()?)))
        .collect()
}
