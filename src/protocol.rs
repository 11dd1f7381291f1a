//! Wire format shared by the sender and the receiver.
//!
//! ```text
//! offset 0..7   : file size (u64, big endian)
//! offset 8      : '\n'
//! offset 9..k   : file name, terminated by the next '\n'
//! offset k+1..  : exactly `file size` bytes of payload
//! ```
//!
//! Nothing is ever sent back from the receiver.

use std::io::{self, BufRead, ErrorKind, Read};

use crate::error::{Result, TransferError};

pub const SIZE_FIELD_LEN: usize = 9;
pub const DELIMITER: u8 = b'\n';
pub const CHUNK_SIZE: usize = 8 * 1024; // 8 KiB

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferHeader {
    pub file_size: u64,
    pub file_name: String,
}

impl TransferHeader {
    pub fn new(file_name: impl Into<String>, file_size: u64) -> TransferHeader {
        TransferHeader {
            file_size,
            file_name: file_name.into(),
        }
    }

    pub fn size_field(&self) -> [u8; SIZE_FIELD_LEN] {
        let mut buf = [0u8; SIZE_FIELD_LEN];
        buf[..8].copy_from_slice(&self.file_size.to_be_bytes());
        buf[8] = DELIMITER;
        buf
    }

    pub fn name_field(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.file_name.len() + 1);
        buf.extend_from_slice(self.file_name.as_bytes());
        buf.push(DELIMITER);
        buf
    }

    /// Parses a header off the front of `reader`, leaving it positioned at
    /// the first payload byte.
    ///
    /// The returned name is already reduced to a bare base name and is safe
    /// to join onto a destination directory.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<TransferHeader> {
        let mut size = [0u8; SIZE_FIELD_LEN];
        reader
            .read_exact(&mut size)
            .map_err(|source| TransferError::Framing {
                field: "file size",
                source,
            })?;
        if size[8] != DELIMITER {
            return Err(TransferError::Framing {
                field: "file size",
                source: io::Error::new(
                    ErrorKind::InvalidData,
                    format!("expected delimiter at offset 8, got {:#04x}", size[8]),
                ),
            });
        }
        let mut be = [0u8; 8];
        be.copy_from_slice(&size[..8]);
        let file_size = u64::from_be_bytes(be);

        let mut raw = Vec::new();
        reader
            .read_until(DELIMITER, &mut raw)
            .map_err(|source| TransferError::Framing {
                field: "file name",
                source,
            })?;
        if raw.last() != Some(&DELIMITER) {
            return Err(TransferError::Framing {
                field: "file name",
                source: io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "stream ended before the name delimiter",
                ),
            });
        }
        raw.pop();

        let decoded = String::from_utf8(raw)
            .map_err(|_| TransferError::Validation("file name is not valid UTF-8".to_string()))?;
        let trimmed = decoded.trim();
        if trimmed.is_empty() {
            return Err(TransferError::Validation("empty file name".to_string()));
        }
        let file_name = match base_name(trimmed) {
            Some(n) => n.to_string(),
            None => return Err(TransferError::Validation(format!("{:?} has no base name", trimmed))),
        };

        Ok(TransferHeader {
            file_size,
            file_name,
        })
    }
}

/// Last path component of `raw`, splitting on both `/` and `\`.
///
/// Returns `None` when nothing usable is left (`""`, `"."`, `".."`, `"dir/"`).
pub fn base_name(raw: &str) -> Option<&str> {
    let name = raw.rsplit(|c| c == '/' || c == '\\').next()?.trim();
    match name {
        "" | "." | ".." => None,
        n => Some(n),
    }
}
