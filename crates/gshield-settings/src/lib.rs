//! Config parsing and profile/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{GshieldConfigV1, MergeConfig, WalkConfig};
pub use presets::{DEFAULT_PROFILE, PROFILES};
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `gshield.toml` into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<GshieldConfigV1> {
    let cfg: GshieldConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective merge policy and walk options (profile, then file, then overrides).
pub fn resolve_config(
    cfg: GshieldConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
