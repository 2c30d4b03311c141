//! ICC encodings shared by the schema engine
//!
//! Signatures identify both tags (`wtpt`, `chad`, ...) and the type
//! families stored inside them (`XYZ `, `mluc`, ...). Numbers follow
//! ICC.1:2022 Section 4.

mod types;

pub use types::{S15Fixed16, Signature};
