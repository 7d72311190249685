use gshield_domain::{ConflictPolicy, MergePolicy, WalkOptions};

pub const DEFAULT_PROFILE: &str = "default";

/// Known profile names, in help order.
pub const PROFILES: [&str; 3] = [DEFAULT_PROFILE, "strict", "legacy"];

/// Profile defaults before `gshield.toml` and CLI overrides apply.
#[derive(Clone, Debug)]
pub struct Preset {
    pub merge: MergePolicy,
    pub walk: WalkOptions,
}

pub fn preset(profile: &str) -> Option<Preset> {
    match profile {
        DEFAULT_PROFILE => Some(default_profile()),
        "strict" => Some(strict_profile()),
        "legacy" => Some(legacy_profile()),
        _ => None,
    }
}

fn default_profile() -> Preset {
    Preset {
        merge: MergePolicy::default(),
        walk: WalkOptions::default(),
    }
}

/// Any disagreement between documents is an error.
fn strict_profile() -> Preset {
    Preset {
        merge: MergePolicy {
            on_conflict: ConflictPolicy::Fail,
            ..MergePolicy::default()
        },
        walk: WalkOptions::default(),
    }
}

/// Output readable by manifest parsers that reject `\x` escapes.
fn legacy_profile() -> Preset {
    Preset {
        merge: MergePolicy::default(),
        walk: WalkOptions {
            skip_parser_escapes: true,
            ..WalkOptions::default()
        },
    }
}
