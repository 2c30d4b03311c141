//! # decode-tests
//!
//! Cross-checks for iccschema against real ICC profiles.
//!
//! This crate provides:
//! - A minimal tag-table walker, since iccschema decodes one tag at a time
//! - Builders for synthetic tags and profiles
//! - Reference profiles serialized by lcms2
//!
//! ## Test Categories
//!
//! 1. **Real Profiles**: lcms2-generated header and tags decode correctly
//! 2. **Selection**: schema precedence against the bundled table
//! 3. **Concurrency**: one shared registry, many decoding threads
//! 4. **Properties**: seeded random layouts consume exactly their width

pub mod fixtures;
pub mod reference;
pub mod table;

use std::sync::OnceLock;

pub use table::{TagEntry, decode_all, tag_entries};

/// Install a test-friendly subscriber once per test binary
///
/// Honors `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    static ONCE: OnceLock<()> = OnceLock::new();
    ONCE.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
