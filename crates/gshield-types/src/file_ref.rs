use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix every trusted-file token carries.
pub const FILE_URI_PREFIX: &str = "file:";

/// A `file:<absolute-path>` token as written into `sgx.trusted_files`.
///
/// Construction does not validate that the path is absolute; callers pass paths
/// produced by the walker, which are absolute by construction.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedFileRef(String);

impl TrustedFileRef {
    pub fn from_path(path: &Utf8Path) -> Self {
        Self(format!("{FILE_URI_PREFIX}{path}"))
    }

    /// Wrap an existing token. Returns `None` when the `file:` prefix is missing.
    pub fn parse<S: AsRef<str>>(token: S) -> Option<Self> {
        let token = token.as_ref();
        token
            .starts_with(FILE_URI_PREFIX)
            .then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path part of the token, without `file:`.
    pub fn path(&self) -> &str {
        &self.0[FILE_URI_PREFIX.len()..]
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TrustedFileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrustedFileRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
