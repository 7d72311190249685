use crate::model::GshieldConfigV1;
use crate::presets::{self, DEFAULT_PROFILE, PROFILES};
use anyhow::Context;
use camino::Utf8PathBuf;
use gshield_domain::{ConflictPolicy, MergePolicy, WalkOptions};

/// Walk root used when neither the config nor the CLI names one.
pub const DEFAULT_WALK_ROOT: &str = "/";

/// Values from the command line. They win over `gshield.toml`.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    /// Force `ConflictPolicy::Fail`.
    pub strict: bool,
    pub root: Option<Utf8PathBuf>,
    pub sysroot: Option<Utf8PathBuf>,
    pub follow_symlinks: Option<bool>,
    pub skip_parser_escapes: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub profile: String,
    pub merge: MergePolicy,
    pub walk: WalkOptions,
    pub root: Utf8PathBuf,
}

pub fn resolve_config(
    cfg: GshieldConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let preset = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected one of {})",
            PROFILES.join(", ")
        )
    })?;
    let mut merge = preset.merge;
    let mut walk = preset.walk;

    // Merge policy
    if let Some(conflict) = cfg.merge.conflict.as_deref() {
        merge.on_conflict = parse_conflict(conflict)?;
    }
    if let Some(keys) = cfg.merge.concat_keys {
        validate_key_paths(&keys)?;
        merge.concat_keys = keys.into_iter().collect();
    }
    if overrides.strict {
        merge.on_conflict = ConflictPolicy::Fail;
    }

    // Walk options
    if let Some(v) = overrides.follow_symlinks.or(cfg.walk.follow_symlinks) {
        walk.follow_symlinks = v;
    }
    if let Some(v) = overrides
        .skip_parser_escapes
        .or(cfg.walk.skip_parser_escapes)
    {
        walk.skip_parser_escapes = v;
    }
    walk.sysroot = overrides
        .sysroot
        .or_else(|| cfg.walk.sysroot.map(Utf8PathBuf::from))
        .or(walk.sysroot);

    let root = overrides
        .root
        .or_else(|| cfg.walk.root.map(Utf8PathBuf::from))
        .or_else(|| walk.sysroot.clone())
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_WALK_ROOT));

    Ok(ResolvedConfig {
        profile,
        merge,
        walk,
        root,
    })
}

fn parse_conflict(v: &str) -> anyhow::Result<ConflictPolicy> {
    match v {
        "override" => Ok(ConflictPolicy::Override),
        "fail" => Ok(ConflictPolicy::Fail),
        other => anyhow::bail!("unknown merge.conflict: {other} (expected 'override' or 'fail')"),
    }
}

fn validate_key_paths(keys: &[String]) -> anyhow::Result<()> {
    for key in keys {
        if key.is_empty() || key.split('.').any(str::is_empty) {
            anyhow::bail!("invalid merge.concat_keys entry: `{key}` (expected a dotted key path)");
        }
    }
    Ok(())
}
