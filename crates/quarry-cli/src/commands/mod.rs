//! CLI command implementations.

pub mod common;
pub mod import;
pub mod roundtrip;
pub mod version;
