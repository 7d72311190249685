use serde::{Deserialize, Serialize};

/// `gshield.toml` schema v1.
///
/// Every field is optional; unset fields fall back to the selected profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GshieldConfigV1 {
    /// Optional schema string for tooling (`gshield.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub walk: WalkConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// `override` or `fail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,

    /// Replaces the profile's concatenable key paths when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concat_keys: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sysroot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_symlinks: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_parser_escapes: Option<bool>,
}
