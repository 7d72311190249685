//! The `build-manifest` use case: merge the manifest inputs in precedence order.

use anyhow::Context;
use gshield_domain::env::{self, SkippedEnv};
use gshield_domain::{MergeNote, MergePolicy, NamedDocument, merge_in_order};
use serde_json::Value as Json;
use tracing::info;

/// Inputs in precedence order; earlier inputs win on conflicts.
#[derive(Clone, Debug)]
pub struct BuildManifestInput<'a> {
    /// Display name of the user manifest (usually its file name).
    pub user_name: &'a str,
    pub user_manifest: &'a str,
    pub template_name: &'a str,
    pub template_manifest: &'a str,
    /// `Env` of the base image, `KEY=VALUE` entries.
    pub image_env: &'a [String],
    /// Captured `ldconfig -v -N -X` output.
    pub ldconfig_output: Option<&'a str>,
    pub ld_library_path: Option<&'a str>,
    /// Executable search path of the base image.
    pub env_path: Option<&'a str>,
    pub policy: &'a MergePolicy,
}

#[derive(Clone, Debug)]
pub struct BuildManifestOutput {
    /// Merged manifest as TOML.
    pub manifest: String,
    pub notes: Vec<MergeNote>,
    pub skipped_env: Vec<SkippedEnv>,
}

const IMAGE_ENV_NAME: &str = "<image environment>";
const HOST_DEFAULTS_NAME: &str = "<host defaults>";

pub fn run_build_manifest(input: BuildManifestInput<'_>) -> anyhow::Result<BuildManifestOutput> {
    let user = NamedDocument::parse(input.user_name, input.user_manifest)
        .context("parse user manifest")?;
    let template = NamedDocument::parse(input.template_name, input.template_manifest)
        .context("parse template manifest")?;

    let image_env = env::image_env_document(input.image_env);

    let library_paths = match input.ldconfig_output {
        Some(output) => Some(env::library_paths_from_ldconfig(output, input.ld_library_path)),
        None => input.ld_library_path.map(str::to_string),
    };
    let host = env::host_defaults_document(library_paths.as_deref(), input.env_path);

    let outcome = merge_in_order(
        [
            user,
            template,
            NamedDocument::new(IMAGE_ENV_NAME, image_env.document),
            NamedDocument::new(HOST_DEFAULTS_NAME, host),
        ],
        input.policy,
    )
    .context("merge manifests")?;

    info!(
        notes = outcome.notes.len(),
        skipped_env = image_env.skipped.len(),
        "merged manifest"
    );

    let manifest = toml::to_string(&outcome.document).context("serialize manifest")?;
    Ok(BuildManifestOutput {
        manifest,
        notes: outcome.notes,
        skipped_env: image_env.skipped,
    })
}

/// Extract `Env` from image configuration JSON.
///
/// Accepts the OCI image config (`{"config": {"Env": [..]}}`), a single container engine
/// inspect object (`{"Config": {"Env": [..]}}`), an inspect array of those, or a bare
/// array of strings.
pub fn parse_image_env(json_text: &str) -> anyhow::Result<Vec<String>> {
    let doc: Json = serde_json::from_str(json_text).context("parse image config JSON")?;

    let doc = match &doc {
        Json::Array(items) if items.iter().all(Json::is_string) => &doc,
        Json::Array(items) => items
            .first()
            .context("image inspect output is an empty array")?,
        _ => &doc,
    };

    let env = match doc {
        Json::Array(_) => Some(doc),
        Json::Object(_) => ["Config", "config"]
            .iter()
            .find_map(|k| doc.get(k))
            .and_then(|config| config.get("Env")),
        _ => None,
    };

    let Some(env) = env else {
        return Ok(Vec::new());
    };
    match env {
        Json::Null => Ok(Vec::new()),
        Json::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .with_context(|| format!("image Env entry is not a string: {v}"))
            })
            .collect(),
        other => anyhow::bail!("image Env is not an array: {other}"),
    }
}
