//! Binary primitives for the canonical wire encoding.
//!
//! All fixed-width integers are big-endian. Counts and lengths use a compact
//! variable-length encoding: values below `0xfd` occupy a single byte, larger
//! values are a one-byte marker followed by a big-endian u16, u32 or u64.
//! Length-prefixed blobs are capped at [`MAX_VARBLOB_LEN`] before any
//! allocation happens, so a hostile length field cannot exhaust memory.

use crate::hash::Hash;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Upper bound on a single length-prefixed blob (script or flag), in bytes.
pub const MAX_VARBLOB_LEN: u64 = 1 << 20;

/// Errors that can occur while reading or writing wire primitives.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("input ended while reading {0}")]
    Truncated(&'static str),
    #[error("input ended in the middle of a varint")]
    MalformedVarint,
    #[error("declared length {len} exceeds the {max} byte limit")]
    LengthLimitExceeded { len: u64, max: u64 },
    #[error("string is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("stream error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        CodecError::Io(err)
    }
}

fn read_exact_field<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    field: &'static str,
) -> Result<(), CodecError> {
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated(field)
        } else {
            CodecError::Io(err)
        }
    })
}

/// Read a big-endian u32.
pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    read_exact_field(reader, &mut buf, "u32")?;
    Ok(u32::from_be_bytes(buf))
}

/// Write a big-endian u32.
pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<(), CodecError> {
    writer.write_all(&value.to_be_bytes()).map_err(CodecError::Io)
}

/// Read a big-endian u64.
pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64, CodecError> {
    let mut buf = [0u8; 8];
    read_exact_field(reader, &mut buf, "u64")?;
    Ok(u64::from_be_bytes(buf))
}

/// Write a big-endian u64.
pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<(), CodecError> {
    writer.write_all(&value.to_be_bytes()).map_err(CodecError::Io)
}

/// Read a variable-length unsigned integer.
///
/// A missing first byte reports [`CodecError::Truncated`]; an input that ends
/// after the marker byte reports [`CodecError::MalformedVarint`].
pub fn read_varint<R: Read>(reader: &mut R) -> Result<u64, CodecError> {
    let mut prefix = [0u8; 1];
    read_exact_field(reader, &mut prefix, "varint")?;

    match prefix[0] {
        0xfd => Ok(u64::from(read_varint_payload::<R, 2>(reader).map(u16::from_be_bytes)?)),
        0xfe => Ok(u64::from(read_varint_payload::<R, 4>(reader).map(u32::from_be_bytes)?)),
        0xff => read_varint_payload::<R, 8>(reader).map(u64::from_be_bytes),
        small => Ok(u64::from(small)),
    }
}

fn read_varint_payload<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::MalformedVarint
        } else {
            CodecError::Io(err)
        }
    })?;
    Ok(buf)
}

/// Write a variable-length unsigned integer, always using the shortest form.
pub fn write_varint<W: Write>(writer: &mut W, value: u64) -> Result<(), CodecError> {
    let result = match value {
        0..=0xfc => writer.write_all(&[value as u8]),
        0xfd..=0xffff => {
            writer.write_all(&[0xfd])?;
            writer.write_all(&(value as u16).to_be_bytes())
        }
        0x10000..=0xffff_ffff => {
            writer.write_all(&[0xfe])?;
            writer.write_all(&(value as u32).to_be_bytes())
        }
        _ => {
            writer.write_all(&[0xff])?;
            writer.write_all(&value.to_be_bytes())
        }
    };
    result.map_err(CodecError::Io)
}

/// Read a varint length prefix followed by that many raw bytes.
pub fn read_varbytes<R: Read>(reader: &mut R) -> Result<Vec<u8>, CodecError> {
    let len = read_varint(reader)?;
    if len > MAX_VARBLOB_LEN {
        return Err(CodecError::LengthLimitExceeded {
            len,
            max: MAX_VARBLOB_LEN,
        });
    }

    let mut buf = vec![0u8; len as usize];
    read_exact_field(reader, &mut buf, "byte blob")?;
    Ok(buf)
}

/// Write a varint length prefix followed by the raw bytes.
pub fn write_varbytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<(), CodecError> {
    write_varint(writer, bytes.len() as u64)?;
    writer.write_all(bytes).map_err(CodecError::Io)
}

/// Read a length-prefixed UTF-8 string.
pub fn read_varstring<R: Read>(reader: &mut R) -> Result<String, CodecError> {
    let bytes = read_varbytes(reader)?;
    Ok(String::from_utf8(bytes)?)
}

/// Write a length-prefixed UTF-8 string.
pub fn write_varstring<W: Write>(writer: &mut W, s: &str) -> Result<(), CodecError> {
    write_varbytes(writer, s.as_bytes())
}

/// Read a raw 32-byte hash.
pub fn read_hash<R: Read>(reader: &mut R) -> Result<Hash, CodecError> {
    let mut buf = [0u8; 32];
    read_exact_field(reader, &mut buf, "hash")?;
    Ok(Hash::from_bytes(buf))
}

/// Write a raw 32-byte hash.
pub fn write_hash<W: Write>(writer: &mut W, hash: &Hash) -> Result<(), CodecError> {
    writer.write_all(hash.as_ref()).map_err(CodecError::Io)
}
