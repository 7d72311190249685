use anyhow::Context;
use gshield_settings::{GshieldConfigV1, Overrides, ResolvedConfig};

/// Parse and resolve `gshield.toml` contents. An empty string means "no config file".
pub fn load_config(config_text: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        GshieldConfigV1::default()
    } else {
        gshield_settings::parse_config_toml(config_text).context("parse config")?
    };
    gshield_settings::resolve_config(cfg, overrides).context("resolve config")
}
