//! Options for trusted-file discovery. The walk itself lives in the filesystem adapter.

use camino::Utf8PathBuf;

/// Hex escape sequence that some manifest parsers reject inside basic strings.
pub const PARSER_ESCAPE_SEQUENCE: &str = "\\x";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow symbolic links to files and directories.
    ///
    /// Off by default: links inside an image can point outside the intended tree or form
    /// cycles. When off, symlinks are neither descended into nor recorded.
    pub follow_symlinks: bool,
    /// Skip paths containing [`PARSER_ESCAPE_SEQUENCE`].
    pub skip_parser_escapes: bool,
    /// Treat the walked tree as an unpacked image rooted here.
    ///
    /// Exclusion rules and emitted tokens then use the path relative to this prefix,
    /// re-anchored at `/`. Without it, walked paths are used as-is (the in-image case).
    pub sysroot: Option<Utf8PathBuf>,
}
