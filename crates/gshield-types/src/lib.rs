//! Stable DTOs and IDs used across the gshield workspace.
//!
//! This crate is intentionally boring:
//! - the trusted-file reference token written into manifests
//! - the enclave identity summary decoded from a signature record
//! - stable manifest key paths

#![forbid(unsafe_code)]

pub mod file_ref;
pub mod identity;
pub mod ids;

pub use file_ref::TrustedFileRef;
pub use identity::EnclaveIdentity;
