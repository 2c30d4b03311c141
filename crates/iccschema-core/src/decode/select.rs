//! Schema selection
//!
//! Tag and type signatures are not a clean bijection: several tags reuse
//! generic types, and a few need the declared type overridden. Selection
//! therefore tries a fixed sequence of lookups and takes the first hit.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::icc::Signature;
use crate::schema::{SchemaDefinition, SchemaRegistry};
use crate::view::ByteView;

/// Logical name of the generic 3x3 matrix layout
const MATRIX_3X3: &str = "matrix3x3Type";

/// Generic types resolved by their own type signature
const GENERIC_TYPES: [Signature; 6] = [
    Signature::TEXT,
    Signature::TEXT_DESC,
    Signature::MLUC,
    Signature::XYZ,
    Signature::CURVE,
    Signature::ZXML,
];

/// Canonical logical name for a type signature, if it has one
pub fn canonical_type_name(type_sig: Signature) -> Option<&'static str> {
    match &type_sig.to_bytes() {
        b"mft1" => Some("lut8Type"),
        b"mft2" => Some("lut16Type"),
        b"text" => Some("textType"),
        b"desc" => Some("descType"),
        b"mluc" => Some("mlucType"),
        b"XYZ " => Some("XYZType"),
        b"curv" => Some("curveType"),
        b"ZXML" => Some("ZXMLType"),
        _ => None,
    }
}

fn legacy_lut_name(type_sig: Signature) -> Option<&'static str> {
    match type_sig {
        Signature::LUT8 | Signature::LUT16 => canonical_type_name(type_sig),
        _ => None,
    }
}

/// Pick the schema for a tag
///
/// `type_offset` is where the tag's embedded type signature starts (the
/// tag's first byte). Precedence:
///
/// 1. the tag signature itself is registered
/// 2. the type signature is registered
/// 3. `mft1` / `mft2` resolve as `lut8Type` / `lut16Type`
/// 4. `chad` (as tag or type) uses `matrix3x3Type`; a registered type
///    signature already matched at step 2 wins over this
/// 5. generic types (`text`, `desc`, `mluc`, `XYZ `, `curv`, `ZXML`)
///    resolve by type signature or canonical name
///
/// Returns `Ok(None)` when nothing applies; callers fall back to raw bytes.
pub fn select_schema(
    registry: &SchemaRegistry,
    tag_sig: Signature,
    view: &ByteView<'_>,
    type_offset: usize,
) -> Result<Option<Arc<SchemaDefinition>>> {
    let tag_key = tag_sig.to_string();
    if registry.contains(&tag_key) {
        debug!(tag = %tag_key, "schema selected by tag signature");
        return registry.resolve(&tag_key);
    }

    let type_sig = Signature::read(view, type_offset)?;
    let type_key = type_sig.to_string();
    if registry.contains(&type_key) {
        debug!(tag = %tag_key, type_sig = %type_key, "schema selected by type signature");
        return registry.resolve(&type_key);
    }

    if let Some(name) = legacy_lut_name(type_sig) {
        debug!(tag = %tag_key, type_sig = %type_key, name, "schema selected as legacy LUT");
        return registry.resolve(name);
    }

    if tag_sig == Signature::CHAD || type_sig == Signature::CHAD {
        debug!(tag = %tag_key, type_sig = %type_key, "chromatic adaptation uses 3x3 matrix");
        return registry.resolve(MATRIX_3X3);
    }

    if GENERIC_TYPES.contains(&type_sig) {
        if let Some(def) = registry.resolve(&type_key)? {
            return Ok(Some(def));
        }
        if let Some(name) = canonical_type_name(type_sig) {
            debug!(tag = %tag_key, type_sig = %type_key, name, "schema selected by canonical name");
            return registry.resolve(name);
        }
    }

    debug!(tag = %tag_key, type_sig = %type_key, "no schema for tag");
    Ok(None)
}
