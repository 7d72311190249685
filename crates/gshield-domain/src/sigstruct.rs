//! SIGSTRUCT decoding.
//!
//! Offsets are fixed by the SGX architecture. There is no version field in the record, so a
//! layout revision means a new [`SigStructLayout`] value, never runtime detection.
//!
//! The signing date is three separate BCD-encoded fields: day (1 byte), month (1 byte) and
//! year (2 bytes, little-endian). `0x2024` therefore reads as the year 2024.

use crate::fingerprint;
use gshield_types::EnclaveIdentity;

/// One fixed-width field of the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Every field the parser reads, keyed by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SigStructLayout {
    pub date_day: FieldSpec,
    pub date_month: FieldSpec,
    pub date_year: FieldSpec,
    pub modulus: FieldSpec,
    pub misc_select: FieldSpec,
    pub flags: FieldSpec,
    pub xfrm: FieldSpec,
    pub enclave_hash: FieldSpec,
    pub isv_prod_id: FieldSpec,
    pub isv_svn: FieldSpec,
}

const DATE: usize = 20;
const ATTRIBUTES: usize = 928;

pub const SIGSTRUCT_LAYOUT: SigStructLayout = SigStructLayout {
    date_day: FieldSpec::new("date_day", DATE, 1),
    date_month: FieldSpec::new("date_month", DATE + 1, 1),
    date_year: FieldSpec::new("date_year", DATE + 2, 2),
    modulus: FieldSpec::new("modulus", 128, MODULUS_LEN),
    misc_select: FieldSpec::new("misc_select", 900, 4),
    flags: FieldSpec::new("flags", ATTRIBUTES, 8),
    xfrm: FieldSpec::new("xfrm", ATTRIBUTES + 8, 8),
    enclave_hash: FieldSpec::new("enclave_hash", 960, 32),
    isv_prod_id: FieldSpec::new("isv_prod_id", 1024, 2),
    isv_svn: FieldSpec::new("isv_svn", 1026, 2),
};

pub const MODULUS_LEN: usize = 384;

/// Smallest buffer that covers every field in [`SIGSTRUCT_LAYOUT`].
pub const SIGSTRUCT_MIN_LEN: usize = 1028;

/// DEBUG bit in the first byte of `ATTRIBUTES.FLAGS`.
const FLAG_DEBUG: u8 = 0b10;

impl SigStructLayout {
    pub fn fields(&self) -> [FieldSpec; 10] {
        [
            self.date_day,
            self.date_month,
            self.date_year,
            self.modulus,
            self.misc_select,
            self.flags,
            self.xfrm,
            self.enclave_hash,
            self.isv_prod_id,
            self.isv_svn,
        ]
    }

    pub fn required_len(&self) -> usize {
        self.fields().iter().map(FieldSpec::end).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordFormatError {
    #[error("signature record too short: {len} bytes, need at least {required}")]
    TooShort { len: usize, required: usize },
    #[error("misencoded {field} in signature record: {raw:#x} is not BCD")]
    MisencodedDate { field: &'static str, raw: u16 },
    #[error("{field} out of range in signature record: {value}")]
    DateOutOfRange { field: &'static str, value: u16 },
}

/// Decoded SIGSTRUCT fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigStruct {
    pub date_year: u16,
    pub date_month: u8,
    pub date_day: u8,
    pub modulus: [u8; MODULUS_LEN],
    pub enclave_hash: [u8; 32],
    pub isv_prod_id: u16,
    pub isv_svn: u16,
    pub flags: [u8; 8],
    pub xfrm: [u8; 8],
    pub misc_select: [u8; 4],
}

/// Decode a SIGSTRUCT. Fails closed: any error means no fields are returned.
pub fn parse_sigstruct(bytes: &[u8]) -> Result<SigStruct, RecordFormatError> {
    let layout = &SIGSTRUCT_LAYOUT;
    if bytes.len() < SIGSTRUCT_MIN_LEN {
        return Err(RecordFormatError::TooShort {
            len: bytes.len(),
            required: SIGSTRUCT_MIN_LEN,
        });
    }
    let r = Reader { bytes };

    let day = decode_bcd(layout.date_day, u16::from(r.u8(layout.date_day)?))?;
    let month = decode_bcd(layout.date_month, u16::from(r.u8(layout.date_month)?))?;
    let year = decode_bcd(layout.date_year, r.u16_le(layout.date_year)?)?;
    check_range(layout.date_month, month, 1..=12)?;
    check_range(layout.date_day, day, 1..=31)?;

    Ok(SigStruct {
        date_year: year,
        // Range-checked above.
        date_month: month as u8,
        date_day: day as u8,
        modulus: r.array(layout.modulus)?,
        enclave_hash: r.array(layout.enclave_hash)?,
        isv_prod_id: r.u16_le(layout.isv_prod_id)?,
        isv_svn: r.u16_le(layout.isv_svn)?,
        flags: r.array(layout.flags)?,
        xfrm: r.array(layout.xfrm)?,
        misc_select: r.array(layout.misc_select)?,
    })
}

impl SigStruct {
    pub fn is_debug(&self) -> bool {
        self.flags[0] & FLAG_DEBUG != 0
    }

    /// `YYYY-MM-DD`, zero padded.
    pub fn date(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.date_year, self.date_month, self.date_day
        )
    }

    pub fn identity(&self) -> EnclaveIdentity {
        EnclaveIdentity {
            mr_enclave: hex::encode(self.enclave_hash),
            mr_signer: fingerprint::mr_signer(&self.modulus),
            isv_prod_id: self.isv_prod_id,
            isv_svn: self.isv_svn,
            date: self.date(),
            flags: hex::encode(self.flags),
            xfrms: hex::encode(self.xfrm),
            misc_select: hex::encode(self.misc_select),
            debug: self.is_debug(),
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl Reader<'_> {
    fn array<const N: usize>(&self, field: FieldSpec) -> Result<[u8; N], RecordFormatError> {
        debug_assert_eq!(field.width, N, "layout width mismatch for {}", field.name);
        self.bytes
            .get(field.offset..field.offset + N)
            .and_then(|s| <[u8; N]>::try_from(s).ok())
            .ok_or(RecordFormatError::TooShort {
                len: self.bytes.len(),
                required: field.end(),
            })
    }

    fn u8(&self, field: FieldSpec) -> Result<u8, RecordFormatError> {
        self.array::<1>(field).map(|[b]| b)
    }

    fn u16_le(&self, field: FieldSpec) -> Result<u16, RecordFormatError> {
        self.array::<2>(field).map(u16::from_le_bytes)
    }
}

/// Read hex digits as decimal digits (`0x2024` -> 2024). Any nibble above 9 is an error.
fn decode_bcd(field: FieldSpec, raw: u16) -> Result<u16, RecordFormatError> {
    let mut value = 0u16;
    for shift in [12, 8, 4, 0] {
        let digit = (raw >> shift) & 0xf;
        if digit > 9 {
            return Err(RecordFormatError::MisencodedDate {
                field: field.name,
                raw,
            });
        }
        value = value * 10 + digit;
    }
    Ok(value)
}

fn check_range(
    field: FieldSpec,
    value: u16,
    range: std::ops::RangeInclusive<u16>,
) -> Result<(), RecordFormatError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(RecordFormatError::DateOutOfRange {
            field: field.name,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gshield_test_util::{SIGSTRUCT_PREFIX_LEN, SigStructBuilder};

    fn modulus_of(byte: u8) -> [u8; MODULUS_LEN] {
        let mut m = [byte; MODULUS_LEN];
        m[0] = 0x01;
        m
    }

    #[test]
    fn min_len_matches_layout() {
        assert_eq!(SIGSTRUCT_LAYOUT.required_len(), SIGSTRUCT_MIN_LEN);
        assert_eq!(SIGSTRUCT_MIN_LEN, SIGSTRUCT_PREFIX_LEN);
    }

    #[test]
    fn decodes_date_from_separate_fields() {
        let buf = SigStructBuilder::new().date(2024, 3, 15).build();
        assert_eq!(buf.len(), 1028);
        let sig = parse_sigstruct(&buf).expect("parse");
        assert_eq!(sig.date(), "2024-03-15");
        assert_eq!(sig.identity().date, "2024-03-15");
    }

    #[test]
    fn decodes_scalar_and_blob_fields() {
        let buf = SigStructBuilder::new()
            .enclave_hash([0xab; 32])
            .isv_prod_id(0x0102)
            .isv_svn(7)
            .flags([0x06, 0, 0, 0, 0, 0, 0, 0])
            .xfrm([0x03, 0, 0, 0, 0, 0, 0, 0])
            .misc_select([0, 0, 0, 0])
            .build();
        let id = parse_sigstruct(&buf).expect("parse").identity();

        assert_eq!(id.mr_enclave, "ab".repeat(32));
        assert_eq!(id.isv_prod_id, 0x0102);
        assert_eq!(id.isv_svn, 7);
        assert_eq!(id.flags, "0600000000000000");
        assert_eq!(id.xfrms, "0300000000000000");
        assert_eq!(id.misc_select, "00000000");
    }

    #[test]
    fn mr_signer_is_sha256_of_modulus() {
        let modulus = modulus_of(0x5a);
        let buf = SigStructBuilder::new().modulus(&modulus).build();
        let id = parse_sigstruct(&buf).expect("parse").identity();
        assert_eq!(id.mr_signer, fingerprint::mr_signer(&modulus));
    }

    #[test]
    fn mr_signer_ignores_unrelated_fields() {
        let modulus = modulus_of(0x77);
        let a = SigStructBuilder::new().modulus(&modulus).build();
        let b = SigStructBuilder::new()
            .modulus(&modulus)
            .date(2031, 12, 31)
            .enclave_hash([0xff; 32])
            .isv_prod_id(9)
            .isv_svn(9)
            .flags([0xff; 8])
            .build();

        let a = parse_sigstruct(&a).expect("parse a").identity();
        let b = parse_sigstruct(&b).expect("parse b").identity();
        assert_eq!(a.mr_signer, b.mr_signer);
        assert_ne!(a.mr_enclave, b.mr_enclave);
    }

    #[test]
    fn debug_bit_is_second_bit_of_first_flags_byte() {
        let debug = SigStructBuilder::new()
            .flags([0b0000_0010, 0, 0, 0, 0, 0, 0, 0])
            .build();
        let release = SigStructBuilder::new().flags([0; 8]).build();
        let other_bits = SigStructBuilder::new()
            .flags([0b0000_0101, 0b10, 0, 0, 0, 0, 0, 0])
            .build();

        assert!(parse_sigstruct(&debug).expect("parse").identity().debug);
        assert!(!parse_sigstruct(&release).expect("parse").identity().debug);
        assert!(!parse_sigstruct(&other_bits).expect("parse").identity().debug);
    }

    #[test]
    fn full_size_record_parses() {
        let buf = SigStructBuilder::with_len(1808).date(2023, 11, 2).build();
        assert_eq!(parse_sigstruct(&buf).expect("parse").date(), "2023-11-02");
    }

    #[test]
    fn short_buffer_fails_closed() {
        let buf = SigStructBuilder::with_len(1027).build();
        assert_eq!(
            parse_sigstruct(&buf),
            Err(RecordFormatError::TooShort {
                len: 1027,
                required: 1028
            })
        );
        assert!(matches!(
            parse_sigstruct(&[]),
            Err(RecordFormatError::TooShort { len: 0, .. })
        ));
    }

    #[test]
    fn non_bcd_date_is_rejected() {
        let buf = SigStructBuilder::new().raw_date(0x2024, 0x0a, 0x15).build();
        assert_eq!(
            parse_sigstruct(&buf),
            Err(RecordFormatError::MisencodedDate {
                field: "date_month",
                raw: 0x0a
            })
        );

        let buf = SigStructBuilder::new().raw_date(0x20f4, 0x03, 0x15).build();
        assert!(matches!(
            parse_sigstruct(&buf),
            Err(RecordFormatError::MisencodedDate {
                field: "date_year",
                ..
            })
        ));
    }

    #[test]
    fn zero_date_is_out_of_range() {
        let buf = SigStructBuilder::new().raw_date(0, 0, 0).build();
        assert_eq!(
            parse_sigstruct(&buf),
            Err(RecordFormatError::DateOutOfRange {
                field: "date_month",
                value: 0
            })
        );
    }
}
