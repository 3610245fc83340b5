//! The two on-disk encodings of a [`MapSnapshot`].
//!
//! Compact form, all integers little-endian:
//!
//! ```text
//! u32  COMPACT_MAGIC
//! u8   flags (bit 0: payload is zlib compressed)
//! u32  CRC-32 of the stored payload
//! u64  stored payload length
//! ...  payload: bincode encoded snapshot
//! ```
//!
//! The text form is the same snapshot as JSON. It does not depend on the
//! compact layout and is used to migrate maps across layout changes.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use bincode::Options;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::MapSnapshot;

/// Identifies the compact layout. Bump whenever the header or the snapshot
/// structure changes.
pub const COMPACT_MAGIC: u32 = 0x5453_4D02;

const FLAG_ZLIB: u8 = 0b0000_0001;
const HEADER_LEN: usize = 4 + 1 + 4 + 8;

/// Largest payload a compressed map may inflate to.
const MAX_INFLATED_LEN: u64 = 1 << 30;

/// Suffix appended to the map path for the text form.
pub const TEXT_SUFFIX: &str = ".compat.json";

/// Errors that can occur when reading or writing a map file
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Map file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Unknown compact map version {found:#010x} (expected {expected:#010x})", expected = COMPACT_MAGIC)]
    BadMagic { found: u32 },
    #[error("Compact map length mismatch: expected {expected} bytes, found {found}")]
    LengthMismatch { expected: u64, found: u64 },
    #[error("Compact map checksum mismatch")]
    Checksum,
    #[error("Invalid compact map payload: {0}")]
    Decode(#[from] bincode::Error),
    #[error("Invalid text map: {0}")]
    Text(#[from] serde_json::Error),
    #[error("Inconsistent map data: {0}")]
    Inconsistent(String),
}

/// Which of the two encodings to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Compact,
    /// Forward compatible text form.
    Text,
}

impl Format {
    /// File holding this format for the map at `base`.
    pub fn path_for(self, base: &Path) -> PathBuf {
        match self {
            Format::Compact => base.to_path_buf(),
            Format::Text => {
                let mut name = OsString::from(base.as_os_str());
                name.push(TEXT_SUFFIX);
                PathBuf::from(name)
            }
        }
    }
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

// ─── Compact ──────────────────────────────────────────────────────────────────

pub fn encode_compact(snapshot: &MapSnapshot, compress: bool) -> Result<Vec<u8>, PersistError> {
    let mut payload = bincode_options().serialize(snapshot)?;
    let mut flags = 0u8;
    if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload)?;
        payload = encoder.finish()?;
        flags |= FLAG_ZLIB;
    }

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&COMPACT_MAGIC.to_le_bytes());
    bytes.push(flags);
    bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

pub fn decode_compact(bytes: &[u8]) -> Result<MapSnapshot, PersistError> {
    decode_compact_within(bytes, MAX_INFLATED_LEN)
}

fn decode_compact_within(bytes: &[u8], max_inflated: u64) -> Result<MapSnapshot, PersistError> {
    if bytes.len() < HEADER_LEN {
        return Err(PersistError::LengthMismatch {
            expected: HEADER_LEN as u64,
            found: bytes.len() as u64,
        });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&bytes[0..4]);
    let magic = u32::from_le_bytes(magic);
    if magic != COMPACT_MAGIC {
        return Err(PersistError::BadMagic { found: magic });
    }

    let flags = bytes[4];
    if flags & !FLAG_ZLIB != 0 {
        return Err(PersistError::Inconsistent(format!("unknown header flags {flags:#04x}")));
    }

    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&bytes[5..9]);
    let checksum = u32::from_le_bytes(checksum);

    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[9..HEADER_LEN]);
    let len = u64::from_le_bytes(len);

    let payload = &bytes[HEADER_LEN..];
    if payload.len() as u64 != len {
        return Err(PersistError::LengthMismatch {
            expected: HEADER_LEN as u64 + len,
            found: bytes.len() as u64,
        });
    }
    if crc32fast::hash(payload) != checksum {
        return Err(PersistError::Checksum);
    }

    let snapshot = if flags & FLAG_ZLIB != 0 {
        let mut inflated = Vec::new();
        ZlibDecoder::new(payload)
            .take(max_inflated + 1)
            .read_to_end(&mut inflated)?;
        if inflated.len() as u64 > max_inflated {
            return Err(PersistError::Inconsistent(format!(
                "compressed payload inflates past {max_inflated} bytes"
            )));
        }
        bincode_options().deserialize(&inflated)?
    } else {
        bincode_options().deserialize(payload)?
    };
    Ok(snapshot)
}

// ─── Text ─────────────────────────────────────────────────────────────────────

pub fn encode_text(snapshot: &MapSnapshot) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn decode_text(text: &str) -> Result<MapSnapshot, PersistError> {
    Ok(serde_json::from_str(text)?)
}

// ─── Files ────────────────────────────────────────────────────────────────────

/// Write `snapshot` to the file `format` uses for the map at `base`.
pub fn write_snapshot(
    base: &Path,
    format: Format,
    snapshot: &MapSnapshot,
    compress: bool,
) -> Result<PathBuf, PersistError> {
    let path = format.path_for(base);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match format {
        Format::Compact => fs::write(&path, encode_compact(snapshot, compress)?)?,
        Format::Text => fs::write(&path, encode_text(snapshot)?)?,
    }
    Ok(path)
}

/// Read the snapshot stored in `format` for the map at `base`.
pub fn read_snapshot(base: &Path, format: Format) -> Result<MapSnapshot, PersistError> {
    let path = format.path_for(base);
    match format {
        Format::Compact => decode_compact(&fs::read(path)?),
        Format::Text => decode_text(&fs::read_to_string(path)?),
    }
}
