//! Environment-derived manifest documents.
//!
//! Inputs here are always explicit (image config, captured `ldconfig` output, caller-provided
//! variables); nothing is read from the current process environment.

use gshield_types::ids;
use toml::{Table, Value};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvSkipReason {
    /// The value spans several lines, which a single-line TOML string cannot hold.
    Multiline,
    /// No `=` separator.
    MissingSeparator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEnv {
    pub name: String,
    pub reason: EnvSkipReason,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageEnv {
    pub document: Table,
    pub skipped: Vec<SkippedEnv>,
}

/// Build a `loader.env` document from a container image's `Env` list (`KEY=VALUE` entries).
pub fn image_env_document<S: AsRef<str>>(env: &[S]) -> ImageEnv {
    let mut vars = Vec::new();
    let mut skipped = Vec::new();

    for entry in env {
        let entry = entry.as_ref();
        let Some((name, value)) = entry.split_once('=') else {
            warn!(entry, "skipping environment variable without `=`");
            skipped.push(SkippedEnv {
                name: entry.to_string(),
                reason: EnvSkipReason::MissingSeparator,
            });
            continue;
        };
        if entry.contains('\n') {
            warn!(name, "skipping environment variable: its value contains newlines");
            skipped.push(SkippedEnv {
                name: name.to_string(),
                reason: EnvSkipReason::Multiline,
            });
            continue;
        }
        vars.push((name.to_string(), value.to_string()));
    }

    ImageEnv {
        document: loader_env_document(vars),
        skipped,
    }
}

/// Build `{ loader = { env = { .. } } }` from name/value pairs. Later duplicates win.
pub fn loader_env_document<I>(vars: I) -> Table
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env = Table::new();
    for (name, value) in vars {
        env.insert(name, Value::String(value));
    }

    let mut loader = Table::new();
    if !env.is_empty() {
        loader.insert(ids::SECTION_ENV.to_string(), Value::Table(env));
    }

    let mut doc = Table::new();
    if !loader.is_empty() {
        doc.insert(ids::SECTION_LOADER.to_string(), Value::Table(loader));
    }
    doc
}

/// Library search path derived from captured `ldconfig -v -N -X` output.
///
/// Directory lines start in column 0 (`/usr/lib:`); library lines are indented and ignored.
/// Newer `ldconfig` appends ` (from /etc/ld.so.conf.d/...)`, which is dropped. The directory
/// lines are concatenated as-is, then `ld_library_path` is appended. Without an
/// `ld_library_path` the trailing `:` is trimmed.
pub fn library_paths_from_ldconfig(ldconfig_output: &str, ld_library_path: Option<&str>) -> String {
    let mut out: String = ldconfig_output
        .lines()
        .filter(|line| !line.starts_with(char::is_whitespace))
        .map(|line| line.split("(from").next().unwrap_or_default().trim_end())
        .collect();

    match ld_library_path.filter(|p| !p.is_empty()) {
        Some(extra) => out.push_str(extra),
        None => {
            let trimmed = out.trim_end_matches(':').len();
            out.truncate(trimmed);
        }
    }
    out
}

/// Host-derived defaults, lowest precedence in a manifest build.
pub fn host_defaults_document(library_paths: Option<&str>, path: Option<&str>) -> Table {
    let vars = [
        (ids::ENV_LD_LIBRARY_PATH, library_paths),
        (ids::ENV_PATH, path),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .filter(|v| !v.is_empty())
            .map(|v| (name.to_string(), v.to_string()))
    });
    loader_env_document(vars)
}
