//! # iccschema - schema-driven ICC tag decoding
//!
//! Decodes the header and tags of ICC colour profiles by walking a
//! declarative field layout instead of hand-written parsers. Layouts live in
//! a JSON table (a bundled default covers the common v2/v4 types) and can
//! alias one another with `$ref`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use iccschema_core::{SchemaRegistry, Signature, decode_header, decode_tag};
//!
//! let profile = std::fs::read("display.icc").unwrap();
//! let registry = SchemaRegistry::builtin().unwrap();
//!
//! if let Some(header) = decode_header(&registry, &profile).unwrap() {
//!     println!("{}", serde_json::to_string_pretty(&header).unwrap());
//! }
//!
//! // Offset and size come from the profile's tag table
//! let wtpt = decode_tag(&registry, Signature::MEDIA_WHITE, &profile, 0x1F0, 20).unwrap();
//! ```

pub mod decode;
pub mod error;
pub mod icc;
pub mod schema;
pub mod tag;
pub mod view;

pub use decode::{DecodeContext, DecodedRecord, PostProcess, Value, decode, select_schema};
pub use error::{Error, Result};
pub use icc::{S15Fixed16, Signature};
pub use schema::{FieldSpec, FieldType, LengthSource, SchemaDefinition, SchemaRegistry};
pub use tag::{HEADER_SIZE, decode_header, decode_tag};
pub use view::ByteView;

/// Version of iccschema
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
