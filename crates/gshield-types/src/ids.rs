//! Stable manifest key names.
//!
//! Key paths are dotted (`loader.env.PATH`), matching how TOML addresses nested tables.

// Sections
pub const SECTION_SGX: &str = "sgx";
pub const SECTION_LOADER: &str = "loader";
pub const SECTION_ENV: &str = "env";

// Keys: sgx
pub const KEY_TRUSTED_FILES: &str = "trusted_files";
pub const KEY_ALLOWED_FILES: &str = "allowed_files";
pub const KEY_PROTECTED_FILES: &str = "protected_files";
pub const KEY_FILE_CHECK_POLICY: &str = "file_check_policy";

/// Every `sgx.*` list that names files the runtime already knows about.
pub const FILE_LIST_KEYS: [&str; 3] = [KEY_TRUSTED_FILES, KEY_ALLOWED_FILES, KEY_PROTECTED_FILES];

// Keys: loader.env
pub const ENV_LD_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";
pub const ENV_PATH: &str = "PATH";
pub const ENV_LD_PRELOAD: &str = "LD_PRELOAD";

/// Fully-qualified key paths whose colliding string values are joined with `:`.
pub const DEFAULT_CONCAT_KEYS: [&str; 3] = [
    "loader.env.LD_LIBRARY_PATH",
    "loader.env.PATH",
    "loader.env.LD_PRELOAD",
];

/// Separator used when joining concatenable values.
pub const CONCAT_SEPARATOR: &str = ":";

/// `sgx.file_check_policy` value that disables trusted-file generation.
pub const POLICY_ALLOW_ALL_BUT_LOG: &str = "allow_all_but_log";
