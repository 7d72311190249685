//! Paths that are never trusted and never traversed.
//!
//! The rule table is fixed. Patterns are matched against absolute paths as seen inside the
//! image. A directory that matches is pruned with its whole subtree, which matters for
//! pseudo-filesystems (`/proc`, `/sys`) that are infinite, cyclic or permission-restricted.

use globset::{Glob, GlobSet, GlobSetBuilder};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExclusionRule {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

pub const EXCLUSION_RULES: &[ExclusionRule] = &[
    ExclusionRule {
        name: "boot",
        patterns: &["/boot", "/boot/**"],
    },
    ExclusionRule {
        name: "container_marker",
        patterns: &["/.dockerenv", "/.dockerinit"],
    },
    ExclusionRule {
        name: "dev",
        patterns: &["/dev", "/dev/**"],
    },
    ExclusionRule {
        name: "gshadow",
        patterns: &["/etc/gshadow*"],
    },
    ExclusionRule {
        name: "mtab",
        patterns: &["/etc/mtab"],
    },
    ExclusionRule {
        name: "passwd_lock",
        patterns: &["/etc/.pwd.lock"],
    },
    ExclusionRule {
        name: "init_scripts",
        patterns: &["/etc/rc?.d/**"],
    },
    ExclusionRule {
        name: "security_db",
        patterns: &["/etc/security/**"],
    },
    ExclusionRule {
        name: "shadow",
        patterns: &["/etc/shadow*"],
    },
    ExclusionRule {
        name: "helper_python",
        patterns: &["/gramine/python/**"],
    },
    ExclusionRule {
        name: "helper_finalizer",
        patterns: &["/gramine/app_files/finalize_manifest.py"],
    },
    ExclusionRule {
        name: "proc",
        patterns: &["/proc", "/proc/**"],
    },
    ExclusionRule {
        name: "sys",
        patterns: &["/sys", "/sys/**"],
    },
    ExclusionRule {
        name: "var",
        patterns: &["/var", "/var/**"],
    },
];

#[derive(Debug, thiserror::Error)]
#[error("invalid exclusion pattern `{pattern}` in rule `{rule}`")]
pub struct ExclusionError {
    pub rule: &'static str,
    pub pattern: &'static str,
    #[source]
    pub source: globset::Error,
}

/// Compiled form of [`EXCLUSION_RULES`].
#[derive(Clone, Debug)]
pub struct ExclusionFilter {
    set: GlobSet,
    /// Rule name per glob index in `set`.
    rule_names: Vec<&'static str>,
}

impl ExclusionFilter {
    pub fn builtin() -> Result<Self, ExclusionError> {
        let mut builder = GlobSetBuilder::new();
        let mut rule_names = Vec::new();

        for rule in EXCLUSION_RULES {
            for &pattern in rule.patterns {
                let glob = Glob::new(pattern).map_err(|source| ExclusionError {
                    rule: rule.name,
                    pattern,
                    source,
                })?;
                builder.add(glob);
                rule_names.push(rule.name);
            }
        }

        let set = builder.build().map_err(|source| ExclusionError {
            rule: "*",
            pattern: "*",
            source,
        })?;
        Ok(Self { set, rule_names })
    }

    pub fn is_excluded(&self, absolute_path: &str) -> bool {
        self.set.is_match(absolute_path)
    }

    /// Name of the first rule matching `absolute_path`, for diagnostics.
    pub fn matched_rule(&self, absolute_path: &str) -> Option<&'static str> {
        self.set
            .matches(absolute_path)
            .first()
            .map(|&i| self.rule_names[i])
    }
}
