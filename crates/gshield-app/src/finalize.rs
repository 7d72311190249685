//! The `finalize` use case: append discovered trusted files to a manifest.

use anyhow::Context;
use camino::Utf8Path;
use gshield_domain::legacy::{allows_all_files, known_file_refs, normalize_trust_lists};
use gshield_domain::{MergePolicy, NamedDocument, WalkOptions, merge_in_order};
use gshield_types::ids;
use toml::{Table, Value};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct FinalizeInput<'a> {
    pub manifest_name: &'a str,
    pub manifest_text: &'a str,
    /// Directory to walk for trusted files.
    pub root: &'a Utf8Path,
    pub walk: &'a WalkOptions,
    pub policy: &'a MergePolicy,
}

#[derive(Clone, Debug)]
pub struct FinalizeOutput {
    /// Finalized manifest as TOML.
    pub manifest: String,
    /// Number of trusted files appended.
    pub added: usize,
    /// False when `sgx.file_check_policy` disabled the walk.
    pub walked: bool,
}

const DISCOVERED_NAME: &str = "<discovered trusted files>";

pub fn run_finalize(input: FinalizeInput<'_>) -> anyhow::Result<FinalizeOutput> {
    let mut manifest = NamedDocument::parse(input.manifest_name, input.manifest_text)
        .context("parse manifest")?;
    normalize_trust_lists(&mut manifest.table);

    if allows_all_files(&manifest.table) {
        warn!(
            "sgx.file_check_policy is `{}`: skipping trusted file generation, \
             the resulting image must not be used in production",
            ids::POLICY_ALLOW_ALL_BUT_LOG
        );
        return Ok(FinalizeOutput {
            manifest: render(&manifest.table)?,
            added: 0,
            walked: false,
        });
    }

    let known = known_file_refs(&manifest.table);
    let discovered = gshield_fs::discover_trusted_files(input.root, &known, input.walk)
        .with_context(|| format!("discover trusted files under {}", input.root))?;
    let added = discovered.len();

    let document = if discovered.is_empty() {
        manifest.table
    } else {
        let list = discovered
            .into_iter()
            .map(|r| Value::String(r.into_string()))
            .collect();
        let mut sgx = Table::new();
        sgx.insert(ids::KEY_TRUSTED_FILES.to_string(), Value::Array(list));
        let mut trusted = Table::new();
        trusted.insert(ids::SECTION_SGX.to_string(), Value::Table(sgx));

        merge_in_order(
            [manifest, NamedDocument::new(DISCOVERED_NAME, trusted)],
            input.policy,
        )
        .context("merge trusted files")?
        .document
    };

    info!(added, known = known.len(), "finalized manifest");
    Ok(FinalizeOutput {
        manifest: render(&document)?,
        added,
        walked: true,
    })
}

fn render(doc: &Table) -> anyhow::Result<String> {
    toml::to_string(doc).context("serialize manifest")
}
