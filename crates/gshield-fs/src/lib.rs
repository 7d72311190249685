//! Filesystem adapters: discover trusted files in an image tree.
//!
//! This crate is allowed to do filesystem IO. It does not parse or write manifests; the
//! caller supplies the set of files the manifest already names and receives tokens back.

#![forbid(unsafe_code)]

mod discover;

pub use discover::{WalkError, discover_trusted_files};
pub use gshield_domain::{PARSER_ESCAPE_SEQUENCE, WalkOptions};
