//! Ordered merge of manifest documents.
//!
//! Documents are merged pairwise, left to right: the accumulated result is the primary
//! for the next step, so earlier documents take precedence.
//!
//! Per key:
//! - both tables: merge recursively, extending the dotted key path
//! - both arrays: concatenate (primary's elements first)
//! - equal values: no-op
//! - unequal values: concatenate with `:` for keys in [`MergePolicy::concat_keys`],
//!   otherwise resolve per [`ConflictPolicy`]
//! - key only in the secondary: copied into the primary

use crate::legacy::normalize_trust_lists;
use crate::policy::{ConflictPolicy, MergePolicy};
use gshield_types::ids::CONCAT_SEPARATOR;
use toml::{Table, Value};
use tracing::warn;

/// A parsed manifest fragment plus a display name used in conflict messages.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedDocument {
    pub name: String,
    pub table: Table,
}

impl NamedDocument {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, MergeError> {
        let name = name.into();
        match toml::from_str::<Table>(text) {
            Ok(table) => Ok(Self { name, table }),
            Err(source) => Err(MergeError::Parse { name, source }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error(
        "duplicate key `{key}`: `{primary_source}` and `{secondary_source}` set different values"
    )]
    Conflict {
        key: String,
        primary_source: String,
        secondary_source: String,
    },
    #[error("failed to parse `{name}`")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Concatenated,
    Overridden,
}

/// A scalar collision that was resolved without failing the merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeNote {
    pub key: String,
    pub resolution: Resolution,
    pub primary_source: String,
    pub secondary_source: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    pub document: Table,
    pub name: String,
    pub notes: Vec<MergeNote>,
}

/// Names of the two documents taking part in one merge step.
#[derive(Clone, Copy, Debug)]
pub struct Sources<'a> {
    pub primary: &'a str,
    pub secondary: &'a str,
}

/// Merge `secondary` into `primary` in place.
pub fn merge_pair(
    primary: &mut Table,
    secondary: Table,
    sources: Sources<'_>,
    policy: &MergePolicy,
    notes: &mut Vec<MergeNote>,
) -> Result<(), MergeError> {
    let mut ctx = MergeCtx {
        sources,
        policy,
        notes,
        path: Vec::new(),
    };
    ctx.merge_tables(primary, secondary)
}

/// Fold `docs` left to right. Trust lists in dict form are normalized first.
///
/// An empty input yields an empty document.
pub fn merge_in_order<I>(docs: I, policy: &MergePolicy) -> Result<MergeOutcome, MergeError>
where
    I: IntoIterator<Item = NamedDocument>,
{
    let mut docs = docs.into_iter();
    let mut notes = Vec::new();

    let Some(first) = docs.next() else {
        return Ok(MergeOutcome {
            document: Table::new(),
            name: String::new(),
            notes,
        });
    };

    let NamedDocument {
        mut name,
        table: mut merged,
    } = first;
    normalize_trust_lists(&mut merged);

    for doc in docs {
        let NamedDocument {
            name: next_name,
            table: mut next,
        } = doc;
        normalize_trust_lists(&mut next);
        merge_pair(
            &mut merged,
            next,
            Sources {
                primary: &name,
                secondary: &next_name,
            },
            policy,
            &mut notes,
        )?;
        name = format!("<merged {name} and {next_name}>");
    }

    Ok(MergeOutcome {
        document: merged,
        name,
        notes,
    })
}

struct MergeCtx<'a, 'n> {
    sources: Sources<'a>,
    policy: &'a MergePolicy,
    notes: &'n mut Vec<MergeNote>,
    path: Vec<String>,
}

impl MergeCtx<'_, '_> {
    fn merge_tables(&mut self, primary: &mut Table, secondary: Table) -> Result<(), MergeError> {
        for (key, incoming) in secondary {
            match primary.get_mut(&key) {
                None => {
                    primary.insert(key, incoming);
                }
                Some(existing) => {
                    self.path.push(key);
                    self.merge_values(existing, incoming)?;
                    self.path.pop();
                }
            }
        }
        Ok(())
    }

    fn merge_values(&mut self, existing: &mut Value, incoming: Value) -> Result<(), MergeError> {
        match (existing, incoming) {
            (Value::Table(a), Value::Table(b)) => self.merge_tables(a, b),
            (Value::Array(a), Value::Array(b)) => {
                a.extend(b);
                Ok(())
            }
            (a, b) if *a == b => Ok(()),
            (a, b) => self.collide(a, b),
        }
    }

    fn collide(&mut self, existing: &mut Value, incoming: Value) -> Result<(), MergeError> {
        let key = self.path.join(".");

        if self.policy.is_concat_key(&key)
            && let (Value::String(a), Value::String(b)) = (&mut *existing, &incoming)
        {
            a.push_str(CONCAT_SEPARATOR);
            a.push_str(b);
            warn!(
                key = %key,
                primary = self.sources.primary,
                secondary = self.sources.secondary,
                "duplicate key, concatenating values"
            );
            self.note(key, Resolution::Concatenated);
            return Ok(());
        }

        match self.policy.on_conflict {
            ConflictPolicy::Override => {
                warn!(
                    key = %key,
                    kept = self.sources.primary,
                    dropped = self.sources.secondary,
                    "duplicate key, keeping value from the primary document"
                );
                self.note(key, Resolution::Overridden);
                Ok(())
            }
            ConflictPolicy::Fail => Err(MergeError::Conflict {
                key,
                primary_source: self.sources.primary.to_string(),
                secondary_source: self.sources.secondary.to_string(),
            }),
        }
    }

    fn note(&mut self, key: String, resolution: Resolution) {
        self.notes.push(MergeNote {
            key,
            resolution,
            primary_source: self.sources.primary.to_string(),
            secondary_source: self.sources.secondary.to_string(),
        });
    }
}
