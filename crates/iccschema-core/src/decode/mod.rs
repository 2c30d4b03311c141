//! Schema-driven field decoding
//!
//! [`decode`] walks a schema's fields in declaration order. Each field starts
//! where the previous one ended; there is no padding or alignment. Reads past
//! the buffer fail with [`Error::BufferRange`](crate::Error::BufferRange),
//! so truncated profiles are reported rather than silently shortened.

mod post;
mod record;
mod select;

pub use post::PostProcess;
pub use record::{DecodedRecord, Value};
pub use select::{canonical_type_name, select_schema};

use tracing::trace;

use crate::error::{Error, Result};
use crate::icc::S15Fixed16;
use crate::schema::{FieldSpec, FieldType, LengthSource, SchemaDefinition};
use crate::view::ByteView;

/// Where the tag being decoded lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeContext {
    /// Declared tag size from the tag table
    pub tag_size: usize,
    /// Offset of the tag's first byte in the buffer
    pub tag_start: usize,
}

impl DecodeContext {
    pub fn new(tag_start: usize, tag_size: usize) -> Self {
        Self {
            tag_size,
            tag_start,
        }
    }
}

/// Decode `schema` from `view` starting at `start`
pub fn decode<'a>(
    view: &ByteView<'a>,
    schema: &SchemaDefinition,
    start: usize,
    ctx: &DecodeContext,
) -> Result<DecodedRecord<'a>> {
    let mut record = DecodedRecord::with_capacity(schema.fields().len());
    let mut offset = start;

    for field in schema.fields() {
        let (value, width) = decode_field(view, schema, field, offset, offset - start, ctx, &record)?;
        trace!(schema = schema.name(), field = %field.name, offset, width, "decoded field");
        record.insert(field.name.clone(), value);
        offset += width;
    }

    record.set_consumed(offset - start);
    Ok(record)
}

/// Decode one field at `offset`, returning the value and its width
fn decode_field<'a>(
    view: &ByteView<'a>,
    schema: &SchemaDefinition,
    field: &FieldSpec,
    offset: usize,
    consumed: usize,
    ctx: &DecodeContext,
    decoded: &DecodedRecord<'a>,
) -> Result<(Value<'a>, usize)> {
    let result = match &field.ty {
        FieldType::Enum(labels) => {
            let raw = view.u32_be(offset)?;
            let label = labels.get(&raw).map(String::as_str).unwrap_or("Unknown");
            let text = format!("{} ({})", raw, label);
            (Value::Annotated { raw, text }, 4)
        }
        FieldType::Bitflags(labels) => {
            let raw = view.u32_be(offset)?;
            let set: Vec<&str> = labels
                .iter()
                .filter(|&(&bit, _)| raw & (1u32 << bit) != 0)
                .map(|(_, label)| label.as_str())
                .collect();
            let text = if set.is_empty() {
                raw.to_string()
            } else {
                format!("{} [{}]", raw, set.join(", "))
            };
            (Value::Annotated { raw, text }, 4)
        }
        FieldType::String(source) => {
            let len = field_length(schema, field, source, consumed, ctx, decoded)?;
            (Value::Text(view.ascii(offset, len)?), len)
        }
        FieldType::Bytes(source) => {
            let len = field_length(schema, field, source, consumed, ctx, decoded)?;
            (Value::Bytes(view.slice(offset, len)?), len)
        }
        FieldType::U8 => (Value::UInt(view.u8(offset)? as u32), 1),
        FieldType::U16 => (Value::UInt(view.u16_be(offset)? as u32), 2),
        FieldType::U32 => (Value::UInt(view.u32_be(offset)?), 4),
        FieldType::S15Fixed16 => {
            let fixed = S15Fixed16::from_raw(view.i32_be(offset)?);
            (Value::Real(fixed.to_f64()), 4)
        }
    };
    Ok(result)
}

fn field_length(
    schema: &SchemaDefinition,
    field: &FieldSpec,
    source: &LengthSource,
    consumed: usize,
    ctx: &DecodeContext,
    decoded: &DecodedRecord<'_>,
) -> Result<usize> {
    match source {
        LengthSource::Remaining => {
            ctx.tag_size
                .checked_sub(consumed)
                .ok_or(Error::TagOverrun {
                    consumed,
                    tag_size: ctx.tag_size,
                })
        }
        LengthSource::Field(name) => decoded
            .get(name)
            .and_then(Value::as_u32)
            .map(|len| len as usize)
            .ok_or_else(|| {
                Error::invalid_schema(
                    schema.name(),
                    format!(
                        "field '{}': length field '{}' has no decoded value",
                        field.name, name
                    ),
                )
            }),
        LengthSource::Fixed(len) => Ok(*len),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn schema(fields: Vec<FieldSpec>) -> SchemaDefinition {
        SchemaDefinition::new("test", fields).unwrap()
    }

    fn labels(pairs: &[(u32, &str)]) -> BTreeMap<u32, String> {
        pairs.iter().map(|&(k, v)| (k, v.to_string())).collect()
    }

    #[test]
    fn test_fixed_width_fields() {
        let data = [
            0x7F, // u8
            0x01, 0x02, // u16
            0x00, 0x00, 0x01, 0x00, // u32
            0x00, 0x01, 0x00, 0x00, // s15Fixed16 = 1.0
            0xFF, 0xFF, 0x00, 0x00, // s15Fixed16 = -1.0
            0xAA, // trailing, not consumed
        ];
        let schema = schema(vec![
            FieldSpec::new("a", FieldType::U8),
            FieldSpec::new("b", FieldType::U16),
            FieldSpec::new("c", FieldType::U32),
            FieldSpec::new("one", FieldType::S15Fixed16),
            FieldSpec::new("minus_one", FieldType::S15Fixed16),
        ]);

        let view = ByteView::new(&data);
        let record = decode(&view, &schema, 0, &DecodeContext::new(0, data.len())).unwrap();

        assert_eq!(record.get("a"), Some(&Value::UInt(0x7F)));
        assert_eq!(record.get("b"), Some(&Value::UInt(0x0102)));
        assert_eq!(record.get("c"), Some(&Value::UInt(256)));
        assert_eq!(record.get("one"), Some(&Value::Real(1.0)));
        assert_eq!(record.get("minus_one"), Some(&Value::Real(-1.0)));
        assert_eq!(record.consumed(), 15);
        assert_eq!(schema.fixed_size(), Some(15));
    }

    #[test]
    fn test_enum_labels() {
        let schema = schema(vec![
            FieldSpec::new("known", FieldType::Enum(labels(&[(2, "Saturation")]))),
            FieldSpec::new("unknown", FieldType::Enum(labels(&[(2, "Saturation")]))),
        ]);
        let data = [0, 0, 0, 2, 0, 0, 0, 9];
        let view = ByteView::new(&data);
        let record = decode(&view, &schema, 0, &DecodeContext::new(0, 8)).unwrap();

        assert_eq!(record.get("known").unwrap().to_string(), "2 (Saturation)");
        assert_eq!(record.get("unknown").unwrap().to_string(), "9 (Unknown)");
        assert_eq!(record.get("unknown").unwrap().as_u32(), Some(9));
        assert_eq!(record.consumed(), 8);
    }

    #[test]
    fn test_enum_always_reads_four_bytes() {
        let mut raw = BTreeMap::new();
        raw.insert(1u32, "One".to_string());
        let schema = schema(vec![
            FieldSpec::new("kind", FieldType::Enum(raw)),
            FieldSpec::new("next", FieldType::U8),
        ]);
        let data = [0, 0, 0, 1, 0x42];
        let record = decode(&ByteView::new(&data), &schema, 0, &DecodeContext::new(0, 5)).unwrap();
        assert_eq!(record.get("next"), Some(&Value::UInt(0x42)));
    }

    #[test]
    fn test_bitflags() {
        let flags = labels(&[(0, "Embedded"), (1, "Dependent"), (3, "Third")]);
        let schema = schema(vec![
            FieldSpec::new("none", FieldType::Bitflags(flags.clone())),
            FieldSpec::new("some", FieldType::Bitflags(flags.clone())),
            FieldSpec::new("unlabelled", FieldType::Bitflags(flags)),
        ]);
        let data = [
            0, 0, 0, 0, // no bits
            0, 0, 0, 0b1011, // bits 0, 1, 3
            0, 0, 0, 0b0100, // bit 2 has no label
        ];
        let view = ByteView::new(&data);
        let record = decode(&view, &schema, 0, &DecodeContext::new(0, 12)).unwrap();

        assert_eq!(record.get("none").unwrap().to_string(), "0");
        assert_eq!(
            record.get("some").unwrap().to_string(),
            "11 [Embedded, Dependent, Third]"
        );
        assert_eq!(record.get("unlabelled").unwrap().to_string(), "4");
    }

    #[test]
    fn test_high_bitflag() {
        let schema = schema(vec![FieldSpec::new(
            "flags",
            FieldType::Bitflags(labels(&[(31, "Top")])),
        )]);
        let data = [0x80, 0, 0, 0];
        let record = decode(&ByteView::new(&data), &schema, 0, &DecodeContext::new(0, 4)).unwrap();
        assert_eq!(record.get("flags").unwrap().to_string(), "2147483648 [Top]");
    }

    #[test]
    fn test_remaining_string_consumes_tag() {
        let schema = schema(vec![FieldSpec::new(
            "text",
            FieldType::String(LengthSource::Remaining),
        )]);
        let data = b"0123456789ABCDEF";
        let view = ByteView::new(data);
        let record = decode(&view, &schema, 0, &DecodeContext::new(0, 10)).unwrap();

        assert_eq!(record.get("text").unwrap().as_str(), Some("0123456789"));
        assert_eq!(record.consumed(), 10);
    }

    #[test]
    fn test_remaining_counts_from_start() {
        let schema = schema(vec![
            FieldSpec::new("sig", FieldType::String(LengthSource::Fixed(4))),
            FieldSpec::new("rest", FieldType::Bytes(LengthSource::Remaining)),
        ]);
        let mut data = vec![0xEE; 6];
        data.extend_from_slice(b"text\x01\x02\x03");
        let view = ByteView::new(&data);
        let record = decode(&view, &schema, 6, &DecodeContext::new(6, 7)).unwrap();

        assert_eq!(record.get("sig").unwrap().as_str(), Some("text"));
        assert_eq!(record.get("rest").unwrap().as_bytes(), Some(&[1u8, 2, 3][..]));
        assert_eq!(record.consumed(), 7);
    }

    #[test]
    fn test_length_from_earlier_field() {
        let schema = schema(vec![
            FieldSpec::new("count", FieldType::U32),
            FieldSpec::new("text", FieldType::String(LengthSource::Field("count".to_string()))),
            FieldSpec::new("after", FieldType::U8),
        ]);
        let data = [0, 0, 0, 3, b'a', b'b', b'c', 0x09];
        let record = decode(&ByteView::new(&data), &schema, 0, &DecodeContext::new(0, 8)).unwrap();

        assert_eq!(record.get("text").unwrap().as_str(), Some("abc"));
        assert_eq!(record.get("after"), Some(&Value::UInt(9)));
    }

    #[test]
    fn test_zero_length_default() {
        let schema = schema(vec![
            FieldSpec::new("empty", FieldType::String(LengthSource::Fixed(0))),
            FieldSpec::new("value", FieldType::U8),
        ]);
        let data = [5];
        let record = decode(&ByteView::new(&data), &schema, 0, &DecodeContext::new(0, 1)).unwrap();
        assert_eq!(record.get("empty").unwrap().as_str(), Some(""));
        assert_eq!(record.get("value"), Some(&Value::UInt(5)));
    }

    #[test]
    fn test_bytes_borrow_source() {
        let data = vec![9u8, 8, 7, 6];
        let schema = schema(vec![FieldSpec::new(
            "raw",
            FieldType::Bytes(LengthSource::Fixed(4)),
        )]);
        let view = ByteView::new(&data);
        let record = decode(&view, &schema, 0, &DecodeContext::new(0, 4)).unwrap();

        let bytes = record.get("raw").unwrap().as_bytes().unwrap();
        assert_eq!(bytes.as_ptr(), data.as_ptr());
    }

    #[test]
    fn test_truncated_buffer_is_reported() {
        let schema = schema(vec![
            FieldSpec::new("a", FieldType::U32),
            FieldSpec::new("b", FieldType::U32),
        ]);
        let data = [0, 0, 0, 1, 0, 0];
        let err = decode(&ByteView::new(&data), &schema, 0, &DecodeContext::new(0, 8)).unwrap_err();
        assert!(matches!(err, Error::BufferRange { offset: 4, len: 4, available: 6 }));
    }

    #[test]
    fn test_corrupt_length_field_is_reported() {
        let schema = schema(vec![
            FieldSpec::new("count", FieldType::U32),
            FieldSpec::new("text", FieldType::String(LengthSource::Field("count".to_string()))),
        ]);
        let data = [0xFF, 0xFF, 0xFF, 0xFF, b'x'];
        let err = decode(&ByteView::new(&data), &schema, 0, &DecodeContext::new(0, 5)).unwrap_err();
        assert!(err.is_buffer_range());
    }

    #[test]
    fn test_remaining_after_overrun() {
        let schema = schema(vec![
            FieldSpec::new("a", FieldType::U32),
            FieldSpec::new("rest", FieldType::Bytes(LengthSource::Remaining)),
        ]);
        let data = [0u8; 8];
        let err = decode(&ByteView::new(&data), &schema, 0, &DecodeContext::new(0, 2)).unwrap_err();
        assert!(matches!(err, Error::TagOverrun { consumed: 4, tag_size: 2 }));
    }

    #[test]
    fn test_missing_length_value_names_schema() {
        let schema = schema(vec![
            FieldSpec::new("count", FieldType::U32),
            FieldSpec::new("text", FieldType::String(LengthSource::Field("count".to_string()))),
        ]);
        let field = &schema.fields()[1];
        let FieldType::String(source) = &field.ty else {
            panic!("Expected string field");
        };

        let err = field_length(&schema, field, source, 0, &DecodeContext::default(), &DecodedRecord::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid schema 'test': field 'text': length field 'count' has no decoded value"
        );
    }
}
