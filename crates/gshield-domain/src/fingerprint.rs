use sha2::{Digest, Sha256};

/// MRSIGNER: SHA-256 over the signer's RSA public key modulus, lowercase hex.
///
/// The modulus is hashed exactly as stored in the signature record (little-endian bytes).
pub fn mr_signer(modulus: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(modulus);
    let digest = hasher.finalize();
    hex::encode(digest)
}
