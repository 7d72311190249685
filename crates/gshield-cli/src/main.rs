//! CLI entry point for gshield.
//!
//! This module is thin: it handles argument parsing, file IO, logging setup and exit codes.
//! All manifest logic lives in the `gshield-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use gshield_app::{
    BuildManifestInput, FinalizeInput, InfoFormat, load_config, parse_image_env,
    run_build_manifest, run_finalize, run_info,
};
use gshield_domain::{MergeError, RecordFormatError};
use gshield_fs::WalkError;
use gshield_settings::Overrides;
use tracing_subscriber::EnvFilter;

const EXIT_RUNTIME: i32 = 1;
const EXIT_MERGE_CONFLICT: i32 = 2;
const EXIT_NON_UTF8_PATH: i32 = 3;
const EXIT_BAD_SIGNATURE: i32 = 4;

#[derive(Parser, Debug)]
#[command(
    name = "gshield",
    version,
    about = "Build and finalize trust manifests for shielded container images"
)]
struct Cli {
    /// Path to gshield config TOML. A missing file means defaults.
    #[arg(long, global = true, default_value = "gshield.toml")]
    config: Utf8PathBuf,

    /// Override profile (default|strict|legacy).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Log verbosity on stderr.
    #[arg(long, global = true, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge user manifest, template, image environment and host defaults.
    BuildManifest {
        /// User-provided manifest (highest precedence).
        #[arg(long)]
        user: Utf8PathBuf,

        /// Rendered entrypoint manifest template.
        #[arg(long)]
        template: Utf8PathBuf,

        /// Image configuration JSON (inspect output or OCI config) providing `Env`.
        #[arg(long)]
        image_env: Option<Utf8PathBuf>,

        /// Captured output of `ldconfig -v -N -X` from the image.
        #[arg(long)]
        ldconfig_output: Option<Utf8PathBuf>,

        /// LD_LIBRARY_PATH to append to the library search path.
        #[arg(long)]
        ld_library_path: Option<String>,

        /// PATH to add as a host default.
        #[arg(long)]
        env_path: Option<String>,

        /// Fail on any conflicting values instead of keeping the earlier one.
        #[arg(long)]
        strict: bool,

        /// Where to write the merged manifest (stdout if omitted).
        #[arg(long, short)]
        out: Option<Utf8PathBuf>,
    },

    /// Append discovered trusted files to a manifest.
    Finalize {
        /// Manifest to finalize.
        #[arg(long)]
        manifest: Utf8PathBuf,

        /// Directory to walk (defaults to the sysroot, or `/`).
        #[arg(long)]
        root: Option<Utf8PathBuf>,

        /// Unpacked image root; trusted file paths are written relative to it.
        #[arg(long)]
        sysroot: Option<Utf8PathBuf>,

        /// Follow symbolic links while walking.
        #[arg(long, overrides_with = "no_follow_symlinks")]
        follow_symlinks: bool,

        /// Do not follow symbolic links, even if the config enables it.
        #[arg(long, overrides_with = "follow_symlinks")]
        no_follow_symlinks: bool,

        /// Skip files whose names contain a `\x` escape sequence.
        #[arg(long, overrides_with = "no_skip_parser_escapes")]
        skip_parser_escapes: bool,

        /// Keep files whose names contain `\x`, even if the config or profile skips them.
        #[arg(long, overrides_with = "skip_parser_escapes")]
        no_skip_parser_escapes: bool,

        /// Where to write the finalized manifest (stdout if omitted).
        #[arg(long, short)]
        out: Option<Utf8PathBuf>,
    },

    /// Print the identity encoded in an enclave signature record.
    Info {
        /// SIGSTRUCT file (e.g. `entrypoint.sig`).
        #[arg(long)]
        sig: Utf8PathBuf,

        #[arg(long, value_enum, default_value = "toml")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Toml,
    Json,
}

impl From<OutputFormat> for InfoFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Toml => InfoFormat::Toml,
            OutputFormat::Json => InfoFormat::Json,
        }
    }
}

/// Logs go to stderr so manifests written to stdout stay clean.
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::new(log_level.to_filter_directive());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    if let Err(err) = run(cli) {
        eprintln!("gshield error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_text = read_config(&cli.config)?;
    let mut overrides = Overrides {
        profile: cli.profile,
        ..Overrides::default()
    };

    match cli.cmd {
        Commands::BuildManifest {
            user,
            template,
            image_env,
            ldconfig_output,
            ld_library_path,
            env_path,
            strict,
            out,
        } => {
            overrides.strict = strict;
            let resolved = load_config(&config_text, overrides)?;

            let user_text = read_text(&user)?;
            let template_text = read_text(&template)?;
            let image_env = match image_env {
                Some(path) => parse_image_env(&read_text(&path)?)
                    .with_context(|| format!("read image env from {path}"))?,
                None => Vec::new(),
            };
            let ldconfig_output = ldconfig_output.as_deref().map(read_text).transpose()?;

            let output = run_build_manifest(BuildManifestInput {
                user_name: user.file_name().unwrap_or(user.as_str()),
                user_manifest: &user_text,
                template_name: template.file_name().unwrap_or(template.as_str()),
                template_manifest: &template_text,
                image_env: &image_env,
                ldconfig_output: ldconfig_output.as_deref(),
                ld_library_path: ld_library_path.as_deref(),
                env_path: env_path.as_deref(),
                policy: &resolved.merge,
            })?;
            emit(out.as_deref(), &output.manifest)
        }

        Commands::Finalize {
            manifest,
            root,
            sysroot,
            follow_symlinks,
            no_follow_symlinks,
            skip_parser_escapes,
            no_skip_parser_escapes,
            out,
        } => {
            overrides.root = root;
            overrides.sysroot = sysroot;
            overrides.follow_symlinks = switch(follow_symlinks, no_follow_symlinks);
            overrides.skip_parser_escapes = switch(skip_parser_escapes, no_skip_parser_escapes);
            let resolved = load_config(&config_text, overrides)?;

            let text = read_text(&manifest)?;
            let output = run_finalize(FinalizeInput {
                manifest_name: manifest.file_name().unwrap_or(manifest.as_str()),
                manifest_text: &text,
                root: &resolved.root,
                walk: &resolved.walk,
                policy: &resolved.merge,
            })?;
            tracing::info!(added = output.added, walked = output.walked, "finalize done");
            emit(out.as_deref(), &output.manifest)
        }

        Commands::Info { sig, format } => {
            let bytes = std::fs::read(&sig).with_context(|| format!("read {sig}"))?;
            let output = run_info(&bytes, format.into())?;
            emit(None, &output.rendered)
        }
    }
}

/// `--flag` / `--no-flag` pair; `None` leaves the config value in place.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Missing config file is allowed; defaults apply.
fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    read_text(path).context("read config")
}

fn read_text(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {path}"))
}

fn emit(out: Option<&Utf8Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create directory: {parent}"))?;
            }
            std::fs::write(path, text).with_context(|| format!("write {path}"))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(MergeError::Conflict { .. }) = cause.downcast_ref::<MergeError>() {
            return EXIT_MERGE_CONFLICT;
        }
        if let Some(WalkError::NonUtf8Path { .. }) = cause.downcast_ref::<WalkError>() {
            return EXIT_NON_UTF8_PATH;
        }
        if cause.downcast_ref::<RecordFormatError>().is_some() {
            return EXIT_BAD_SIGNATURE;
        }
    }
    EXIT_RUNTIME
}
