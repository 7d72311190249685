//! Shared test utilities for the gshield workspace.
//!
//! The SIGSTRUCT offsets below are written out independently of the parser's layout table,
//! so parser tests compare against the hardware layout rather than against themselves.

use std::path::Path;

/// Smallest SIGSTRUCT prefix that covers every decoded field.
pub const SIGSTRUCT_PREFIX_LEN: usize = 1028;

const DATE: usize = 20;
const MODULUS: usize = 128;
const MISC_SELECT: usize = 900;
const ATTRIBUTES: usize = 928;
const ENCLAVE_HASH: usize = 960;
const ISV_PROD_ID: usize = 1024;
const ISV_SVN: usize = 1026;

/// Builds synthetic SIGSTRUCT buffers.
///
/// A fresh builder holds a zeroed buffer with a valid date (2000-01-01), so tests that care
/// about other fields decode without setting one.
#[derive(Clone, Debug)]
pub struct SigStructBuilder {
    buf: Vec<u8>,
}

impl Default for SigStructBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SigStructBuilder {
    pub fn new() -> Self {
        Self::with_len(SIGSTRUCT_PREFIX_LEN)
    }

    /// Full hardware SIGSTRUCT size is 1808 bytes; the parser only needs the prefix.
    pub fn with_len(len: usize) -> Self {
        let mut b = Self { buf: vec![0; len] };
        if len >= DATE + 4 {
            b = b.date(2000, 1, 1);
        }
        b
    }

    /// Set the date from decimal components, stored BCD-encoded as the hardware does.
    pub fn date(self, year: u16, month: u8, day: u8) -> Self {
        self.raw_date(to_bcd16(year), to_bcd8(month), to_bcd8(day))
    }

    /// Set the raw date bytes (no BCD encoding applied).
    pub fn raw_date(mut self, year: u16, month: u8, day: u8) -> Self {
        self.buf[DATE] = day;
        self.buf[DATE + 1] = month;
        self.buf[DATE + 2..DATE + 4].copy_from_slice(&year.to_le_bytes());
        self
    }

    pub fn modulus(mut self, modulus: &[u8; 384]) -> Self {
        self.buf[MODULUS..MODULUS + 384].copy_from_slice(modulus);
        self
    }

    pub fn enclave_hash(mut self, hash: [u8; 32]) -> Self {
        self.buf[ENCLAVE_HASH..ENCLAVE_HASH + 32].copy_from_slice(&hash);
        self
    }

    pub fn isv_prod_id(mut self, id: u16) -> Self {
        self.buf[ISV_PROD_ID..ISV_PROD_ID + 2].copy_from_slice(&id.to_le_bytes());
        self
    }

    pub fn isv_svn(mut self, svn: u16) -> Self {
        self.buf[ISV_SVN..ISV_SVN + 2].copy_from_slice(&svn.to_le_bytes());
        self
    }

    pub fn flags(mut self, flags: [u8; 8]) -> Self {
        self.buf[ATTRIBUTES..ATTRIBUTES + 8].copy_from_slice(&flags);
        self
    }

    pub fn xfrm(mut self, xfrm: [u8; 8]) -> Self {
        self.buf[ATTRIBUTES + 8..ATTRIBUTES + 16].copy_from_slice(&xfrm);
        self
    }

    pub fn misc_select(mut self, misc: [u8; 4]) -> Self {
        self.buf[MISC_SELECT..MISC_SELECT + 4].copy_from_slice(&misc);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

fn to_bcd8(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

fn to_bcd16(v: u16) -> u16 {
    let digits = [v / 1000 % 10, v / 100 % 10, v / 10 % 10, v % 10];
    digits.iter().fold(0, |acc, d| (acc << 4) | d)
}

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}
