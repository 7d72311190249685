use camino::{Utf8Path, Utf8PathBuf};
use gshield_domain::{ExclusionError, ExclusionFilter, PARSER_ESCAPE_SEQUENCE, WalkOptions};
use gshield_types::TrustedFileRef;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("file name is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },
    #[error("walk root is not a directory: {root}")]
    InvalidRoot { root: Utf8PathBuf },
    #[error("sysroot is not a directory: {sysroot}")]
    InvalidSysroot { sysroot: Utf8PathBuf },
    #[error("walk root {root} is outside sysroot {sysroot}")]
    OutsideSysroot {
        root: Utf8PathBuf,
        sysroot: Utf8PathBuf,
    },
    #[error(transparent)]
    Exclusion(#[from] ExclusionError),
}

/// Discover regular files under `root` that should be listed as trusted.
///
/// Traversal is depth-first with directory entries sorted by name, so repeated runs over
/// the same tree produce the same list. Excluded directories are pruned before they are
/// read. Files are skipped when they are not regular files, excluded, contain a line break,
/// are unreadable (logged), or already appear in `already_known`.
///
/// `root` and `opts.sysroot` may be relative; both are canonicalized first, so tokens are
/// always absolute.
///
/// A file or directory name that is not valid UTF-8 aborts the whole run.
pub fn discover_trusted_files(
    root: &Utf8Path,
    already_known: &BTreeSet<String>,
    opts: &WalkOptions,
) -> Result<Vec<TrustedFileRef>, WalkError> {
    let filter = ExclusionFilter::builtin()?;

    let root = canonical_dir(root).ok_or_else(|| WalkError::InvalidRoot {
        root: root.to_path_buf(),
    })?;
    let sysroot = match opts.sysroot.as_deref() {
        Some(s) => Some(
            canonical_dir(s).ok_or_else(|| WalkError::InvalidSysroot {
                sysroot: s.to_path_buf(),
            })?,
        ),
        None => None,
    };
    let sysroot = sysroot.as_deref();
    if let Some(sysroot) = sysroot
        && !root.starts_with(sysroot)
    {
        return Err(WalkError::OutsideSysroot {
            root,
            sysroot: sysroot.to_path_buf(),
        });
    }

    let walker = WalkDir::new(&root)
        .follow_links(opts.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let prune = e.depth() > 0
                && e.file_type().is_dir()
                && Utf8Path::from_path(e.path())
                    .is_some_and(|p| filter.is_excluded(image_path(p, sysroot).as_str()));
            if prune {
                debug!(path = %e.path().display(), "pruned excluded directory");
            }
            !prune
        });

    let mut out = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    path = ?err.path(),
                    error = %err,
                    "skipping entry that could not be read"
                );
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            require_utf8(entry.path())?;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let path = require_utf8(entry.path())?;
        let image = image_path(path, sysroot);

        if let Some(rule) = filter.matched_rule(image.as_str()) {
            debug!(path = %image, rule, "excluded file");
            continue;
        }
        if image.as_str().contains(['\n', '\r']) {
            debug!(path = ?image, "skipping file name with a line break");
            continue;
        }
        if opts.skip_parser_escapes && image.as_str().contains(PARSER_ESCAPE_SEQUENCE) {
            debug!(path = ?image, "skipping file name with a parser escape sequence");
            continue;
        }
        if !is_readable(&image, File::open(path)) {
            continue;
        }

        let token = TrustedFileRef::from_path(&image);
        if already_known.contains(token.as_str()) {
            continue;
        }
        out.push(token);
    }

    info!(root = %root, found = out.len(), "discovered trusted files");
    Ok(out)
}

/// Absolute, symlink-free form of an existing directory.
fn canonical_dir(path: &Utf8Path) -> Option<Utf8PathBuf> {
    path.canonicalize_utf8().ok().filter(|p| p.is_dir())
}

/// Whether the current principal could open the file; failures are logged.
fn is_readable(image: &Utf8Path, opened: std::io::Result<File>) -> bool {
    match opened {
        Ok(_) => true,
        Err(err) => {
            warn!(path = %image, error = %err, "skipping inaccessible file");
            false
        }
    }
}

fn require_utf8(path: &Path) -> Result<&Utf8Path, WalkError> {
    Utf8Path::from_path(path).ok_or_else(|| WalkError::NonUtf8Path {
        path: path.to_path_buf(),
    })
}

/// Absolute path of `path` as seen inside the image.
fn image_path(path: &Utf8Path, sysroot: Option<&Utf8Path>) -> Utf8PathBuf {
    match sysroot.and_then(|s| path.strip_prefix(s).ok()) {
        Some(rel) => Utf8Path::new("/").join(rel),
        None => path.to_path_buf(),
    }
}
