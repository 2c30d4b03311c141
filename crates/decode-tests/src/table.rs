//! Tag table walking
//!
//! The tag count sits right after the 128-byte header, followed by 12-byte
//! entries of signature, offset and size.

use anyhow::{Context, bail, ensure};
use iccschema_core::{DecodedRecord, HEADER_SIZE, SchemaRegistry, Signature, decode_tag};

const ENTRY_SIZE: usize = 12;

/// One tag table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    pub signature: Signature,
    pub offset: usize,
    pub size: usize,
}

fn be_u32(data: &[u8], offset: usize) -> anyhow::Result<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .with_context(|| format!("u32 at {} past end of {} bytes", offset, data.len()))?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read the tag table of a whole profile
pub fn tag_entries(data: &[u8]) -> anyhow::Result<Vec<TagEntry>> {
    let count = be_u32(data, HEADER_SIZE).context("profile has no tag count")? as usize;
    let table_start = HEADER_SIZE + 4;
    let required = table_start + count * ENTRY_SIZE;
    ensure!(
        data.len() >= required,
        "tag table needs {} bytes, profile has {}",
        required,
        data.len()
    );

    (0..count)
        .map(|i| {
            let at = table_start + i * ENTRY_SIZE;
            let entry = TagEntry {
                signature: Signature(be_u32(data, at)?),
                offset: be_u32(data, at + 4)? as usize,
                size: be_u32(data, at + 8)? as usize,
            };
            if entry.offset + entry.size > data.len() {
                bail!(
                    "tag {} at {}+{} exceeds profile size {}",
                    entry.signature,
                    entry.offset,
                    entry.size,
                    data.len()
                );
            }
            Ok(entry)
        })
        .collect()
}

/// Decode every tag in the profile, in table order
pub fn decode_all<'a>(
    registry: &SchemaRegistry,
    data: &'a [u8],
) -> anyhow::Result<Vec<(TagEntry, Option<DecodedRecord<'a>>)>> {
    tag_entries(data)?
        .into_iter()
        .map(|entry| {
            let record = decode_tag(registry, entry.signature, data, entry.offset, entry.size)
                .with_context(|| format!("decoding tag {}", entry.signature))?;
            Ok((entry, record))
        })
        .collect()
}
