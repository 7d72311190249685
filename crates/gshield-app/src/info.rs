//! The `info` use case: decode a SIGSTRUCT and render the enclave identity.

use anyhow::Context;
use gshield_domain::parse_sigstruct;
use gshield_types::EnclaveIdentity;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InfoFormat {
    #[default]
    Toml,
    Json,
}

#[derive(Clone, Debug)]
pub struct InfoOutput {
    pub identity: EnclaveIdentity,
    pub rendered: String,
}

pub fn run_info(sigstruct: &[u8], format: InfoFormat) -> anyhow::Result<InfoOutput> {
    let identity = parse_sigstruct(sigstruct)
        .context("decode signature record")?
        .identity();

    let rendered = match format {
        InfoFormat::Toml => toml::to_string(&identity).context("serialize identity")?,
        InfoFormat::Json => {
            let mut s =
                serde_json::to_string_pretty(&identity).context("serialize identity")?;
            s.push('\n');
            s
        }
    };
    Ok(InfoOutput { identity, rendered })
}
