//! Post-decode transforms
//!
//! Some schemas decode into fields that only make sense combined: the header
//! stores its creation date as six numbers, and `mluc` tags keep their text
//! records after the fixed fields. A [`PostProcess`] derives a new record
//! from a finished decode. Failures are logged and the decoded record is
//! returned unchanged.

use tracing::debug;

use super::{DecodeContext, DecodedRecord, Value};
use crate::error::{Error, Result};
use crate::view::ByteView;

/// Header date subfields, in output order
const TIMESTAMP_PARTS: [&str; 6] = [
    "creationDate_year",
    "creationDate_month",
    "creationDate_day",
    "creationDate_hours",
    "creationDate_minutes",
    "creationDate_seconds",
];

/// Locale records start after type signature, reserved, count and size
const MLUC_RECORDS_OFFSET: usize = 16;
const MLUC_DEFAULT_RECORD_SIZE: usize = 12;

const DECODE_ERROR: &str = "[decode error]";
const OUT_OF_BOUNDS: &str = "[out of bounds]";

/// Transform keyed by schema name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// `ICCHeader`: fold the creation date into one `creationDate` string
    HeaderTimestamp,
    /// `mlucType`: expand locale records into `localized` and `displayString`
    LocalizedStrings,
}

impl PostProcess {
    pub const HEADER_SCHEMA: &'static str = "ICCHeader";
    pub const MLUC_SCHEMA: &'static str = "mlucType";

    /// Transform registered for a schema name
    pub fn for_schema(name: &str) -> Option<Self> {
        match name {
            Self::HEADER_SCHEMA => Some(Self::HeaderTimestamp),
            Self::MLUC_SCHEMA => Some(Self::LocalizedStrings),
            _ => None,
        }
    }

    /// Derive the transformed record
    ///
    /// Never fails: on error the input record is returned as-is.
    pub fn apply<'a>(
        self,
        record: &DecodedRecord<'a>,
        view: &ByteView<'a>,
        ctx: &DecodeContext,
    ) -> DecodedRecord<'a> {
        let derived = match self {
            Self::HeaderTimestamp => compose_timestamp(record),
            Self::LocalizedStrings => expand_localized(record, view, ctx),
        };
        derived.unwrap_or_else(|err| {
            debug!(transform = ?self, error = %err, "post-processing skipped");
            record.clone()
        })
    }
}

fn compose_timestamp<'a>(record: &DecodedRecord<'a>) -> Result<DecodedRecord<'a>> {
    let mut parts = [0u32; 6];
    for (slot, name) in parts.iter_mut().zip(TIMESTAMP_PARTS) {
        *slot = match record.get(name) {
            None => 0,
            Some(value) => value
                .as_u32()
                .ok_or_else(|| Error::PostProcess(format!("'{}' is not numeric", name)))?,
        };
    }
    let [year, month, day, hours, minutes, seconds] = parts;

    // Semicolon before the seconds is the established display format
    let stamp = format!(
        "{}-{:02}-{:02} {:02}:{:02};{:02}",
        year, month, day, hours, minutes, seconds
    );

    // Subfields are dropped and the composed date goes last
    let mut derived = record.clone();
    for name in TIMESTAMP_PARTS {
        derived.remove(name);
    }
    derived.insert("creationDate", Value::Text(stamp));
    Ok(derived)
}

fn expand_localized<'a>(
    record: &DecodedRecord<'a>,
    view: &ByteView<'a>,
    ctx: &DecodeContext,
) -> Result<DecodedRecord<'a>> {
    let count = record.get("count").and_then(Value::as_u32).unwrap_or(0);
    let record_size = match record.get("recordSize").and_then(Value::as_u32) {
        None | Some(0) => MLUC_DEFAULT_RECORD_SIZE,
        Some(size) => size as usize,
    };

    let base = ctx.tag_start;
    let mut offset = base.saturating_add(MLUC_RECORDS_OFFSET);
    let mut localized = Vec::new();

    for _ in 0..count {
        let language = view.ascii(offset, 2)?;
        let region = view.ascii(offset + 2, 2)?;
        let length = view.u32_be(offset + 4)? as usize;
        let text_offset = view.u32_be(offset + 8)? as usize;

        let in_range = text_offset
            .checked_add(length)
            .is_some_and(|end| end <= ctx.tag_size);
        let text = match view.slice(base.saturating_add(text_offset), length) {
            Ok(bytes) => decode_utf16be(bytes),
            Err(_) if in_range => DECODE_ERROR.to_string(),
            Err(_) => OUT_OF_BOUNDS.to_string(),
        };

        let mut entry = DecodedRecord::with_capacity(3);
        entry.insert("language", Value::Text(language));
        entry.insert("region", Value::Text(region));
        entry.insert("text", Value::Text(text));
        localized.push(entry);

        offset = offset.saturating_add(record_size);
    }

    let display = localized
        .iter()
        .map(|entry| {
            let field = |name: &str| entry.get(name).and_then(Value::as_str).unwrap_or_default();
            format!("{}-{}: {}", field("language"), field("region"), field("text"))
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut derived = record.clone();
    derived.insert("localized", Value::List(localized));
    derived.insert("displayString", Value::Text(display));
    Ok(derived)
}

/// Lenient UTF-16BE decode: bad units become U+FFFD, a leading BOM is dropped
fn decode_utf16be(bytes: &[u8]) -> String {
    let chunks = bytes.chunks_exact(2);
    let odd_tail = !chunks.remainder().is_empty();
    let units = chunks.map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

    let mut text: String = char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if odd_tail {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
