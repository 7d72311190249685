//! Pure manifest logic (no IO).
//!
//! - path exclusion rules for trusted-file discovery
//! - the ordered manifest merge engine and its policy
//! - legacy manifest normalization and known-file extraction
//! - image environment and library search path documents
//! - SIGSTRUCT decoding into an enclave identity
//! - trusted-file walk options

#![forbid(unsafe_code)]

pub mod env;
pub mod exclude;
pub mod fingerprint;
pub mod legacy;
pub mod merge;
pub mod policy;
pub mod sigstruct;
pub mod walk;

#[cfg(test)]
mod proptest;

pub use exclude::{ExclusionError, ExclusionFilter};
pub use merge::{
    MergeError, MergeNote, MergeOutcome, NamedDocument, Resolution, Sources, merge_in_order,
    merge_pair,
};
pub use policy::{ConflictPolicy, MergePolicy};
pub use sigstruct::{RecordFormatError, SigStruct, parse_sigstruct};
pub use walk::{PARSER_ESCAPE_SEQUENCE, WalkOptions};
