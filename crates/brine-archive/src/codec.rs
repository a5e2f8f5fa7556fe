//! Binary encode/decode for the payload store.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32` length. No compression, no alignment padding.

use std::io::{Read, Write};

use brine_core::FieldKind;

use crate::error::ArchiveError;
use crate::{FORMAT_VERSION, MAGIC};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), ArchiveError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), ArchiveError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), ArchiveError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), ArchiveError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), ArchiveError> {
    write_u32_le(w, s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, ArchiveError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, ArchiveError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, ArchiveError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, ArchiveError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, ArchiveError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| ArchiveError::MalformedRecord {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

// ── Header and field kind ───────────────────────────────────────

/// Write the store preamble: magic and format version.
pub fn encode_preamble(w: &mut dyn Write) -> Result<(), ArchiveError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)
}

/// Check the store preamble.
pub fn decode_preamble(r: &mut dyn Read) -> Result<(), ArchiveError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ArchiveError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(ArchiveError::UnsupportedVersion { found: version });
    }
    Ok(())
}

/// Encode a field kind: a tag byte, plus the dimension for vectors.
pub fn encode_field_kind(w: &mut dyn Write, kind: FieldKind) -> Result<(), ArchiveError> {
    match kind {
        FieldKind::Scalar => write_u8(w, 0),
        FieldKind::Vector { dims } => {
            write_u8(w, 1)?;
            write_u32_le(w, dims)
        }
    }
}

/// Decode a field kind tag.
pub fn decode_field_kind(r: &mut dyn Read) -> Result<FieldKind, ArchiveError> {
    match read_u8(r)? {
        0 => Ok(FieldKind::Scalar),
        1 => Ok(FieldKind::Vector {
            dims: read_u32_le(r)?,
        }),
        tag => Err(ArchiveError::MalformedRecord {
            detail: format!("unknown field kind tag {tag}"),
        }),
    }
}

// ── Dataset records ─────────────────────────────────────────────

/// Write one dataset record: name, value count, flat values.
pub fn encode_dataset(w: &mut dyn Write, name: &str, values: &[f64]) -> Result<(), ArchiveError> {
    write_length_prefixed_str(w, name)?;
    write_u64_le(w, values.len() as u64)?;
    for &v in values {
        write_f64_le(w, v)?;
    }
    Ok(())
}

/// Decode the next dataset record.
///
/// Returns `Ok(None)` on clean EOF (no bytes available), or an error
/// on truncated data. The name length is read byte-by-byte so a clean
/// end of the record stream is distinguishable from a cut-off record.
pub fn decode_dataset(r: &mut dyn Read) -> Result<Option<(String, Vec<f64>)>, ArchiveError> {
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < 4 {
        match r.read(&mut len_buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(ArchiveError::MalformedRecord {
                    detail: format!("truncated record header: got {filled} of 4 bytes"),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::Io(e)),
        }
    }
    let name_len = u32::from_le_bytes(len_buf) as usize;
    let mut name_buf = vec![0u8; name_len];
    r.read_exact(&mut name_buf)?;
    let name = String::from_utf8(name_buf).map_err(|e| ArchiveError::MalformedRecord {
        detail: format!("invalid UTF-8 dataset name: {e}"),
    })?;

    let count = read_u64_le(r)? as usize;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_f64_le(r)?);
    }
    Ok(Some((name, values)))
}
