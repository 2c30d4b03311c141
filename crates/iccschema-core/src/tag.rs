//! Tag decoding entry points
//!
//! Ties selection, field decoding and post-processing together for one tag
//! or for the profile header. Walking the tag table is the caller's job.

use tracing::debug;

use crate::decode::{self, DecodeContext, DecodedRecord, PostProcess};
use crate::error::Result;
use crate::icc::Signature;
use crate::schema::SchemaRegistry;
use crate::view::ByteView;

/// Schema key of the 128-byte profile header
pub const HEADER_SCHEMA: &str = PostProcess::HEADER_SCHEMA;

/// Size of the profile header in bytes
pub const HEADER_SIZE: usize = 128;

/// Decode the tag `tag_sig` whose data starts at `tag_start`
///
/// `tag_size` is the size declared in the tag table; it bounds `remaining`
/// fields and `mluc` string offsets. Returns `Ok(None)` when no schema
/// applies to the tag.
pub fn decode_tag<'a>(
    registry: &SchemaRegistry,
    tag_sig: Signature,
    data: &'a [u8],
    tag_start: usize,
    tag_size: usize,
) -> Result<Option<DecodedRecord<'a>>> {
    let view = ByteView::new(data);
    let Some(schema) = decode::select_schema(registry, tag_sig, &view, tag_start)? else {
        return Ok(None);
    };

    let ctx = DecodeContext::new(tag_start, tag_size);
    let record = decode::decode(&view, &schema, tag_start, &ctx)?;
    debug!(
        tag = %tag_sig,
        schema = schema.name(),
        consumed = record.consumed(),
        tag_size,
        "tag decoded"
    );

    Ok(Some(post_process(schema.name(), record, &view, &ctx)))
}

/// Decode the profile header at the start of `data`
pub fn decode_header<'a>(
    registry: &SchemaRegistry,
    data: &'a [u8],
) -> Result<Option<DecodedRecord<'a>>> {
    let Some(schema) = registry.resolve(HEADER_SCHEMA)? else {
        return Ok(None);
    };

    let view = ByteView::new(data);
    let ctx = DecodeContext::new(0, HEADER_SIZE);
    let record = decode::decode(&view, &schema, 0, &ctx)?;

    Ok(Some(post_process(schema.name(), record, &view, &ctx)))
}

fn post_process<'a>(
    schema: &str,
    record: DecodedRecord<'a>,
    view: &ByteView<'a>,
    ctx: &DecodeContext,
) -> DecodedRecord<'a> {
    match PostProcess::for_schema(schema) {
        Some(post) => post.apply(&record, view, ctx),
        None => record,
    }
}
