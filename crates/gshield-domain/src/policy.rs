use gshield_types::ids;
use std::collections::BTreeSet;

/// What to do when two documents disagree on a scalar outside the concatenable set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Keep the primary (earlier) document's value and record a warning.
    #[default]
    Override,
    /// Abort the merge.
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergePolicy {
    pub on_conflict: ConflictPolicy,
    /// Dotted key paths whose string values are joined with `:` instead of colliding.
    pub concat_keys: BTreeSet<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            on_conflict: ConflictPolicy::Override,
            concat_keys: ids::DEFAULT_CONCAT_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl MergePolicy {
    pub fn strict() -> Self {
        Self {
            on_conflict: ConflictPolicy::Fail,
            ..Self::default()
        }
    }

    pub fn is_concat_key(&self, key_path: &str) -> bool {
        self.concat_keys.contains(key_path)
    }
}
