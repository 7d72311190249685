use serde::{Deserialize, Serialize};

/// Human-readable identity of a signed enclave.
///
/// Field order is the order the summary is rendered in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveIdentity {
    /// MRENCLAVE, lowercase hex.
    pub mr_enclave: String,
    /// MRSIGNER: SHA-256 over the signer's RSA modulus, lowercase hex.
    pub mr_signer: String,
    pub isv_prod_id: u16,
    pub isv_svn: u16,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub flags: String,
    pub xfrms: String,
    pub misc_select: String,
    /// DEBUG attribute of the enclave.
    pub debug: bool,
}
