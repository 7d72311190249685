//! Use case orchestration for gshield.
//!
//! This crate coordinates the domain, fs and settings layers. The CLI crate depends on it and
//! only handles argument parsing, file IO and exit codes.

#![forbid(unsafe_code)]

mod config;
mod finalize;
mod info;
mod manifest;

pub use config::load_config;
pub use finalize::{FinalizeInput, FinalizeOutput, run_finalize};
pub use info::{InfoFormat, InfoOutput, run_info};
pub use manifest::{BuildManifestInput, BuildManifestOutput, parse_image_env, run_build_manifest};
