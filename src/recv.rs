use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Result, TransferError};
use crate::files::create_destination;
use crate::protocol::{TransferHeader, CHUNK_SIZE};

/// Outcome of one connection.
#[derive(Debug)]
pub struct Received {
    pub file_name: String,
    pub path: PathBuf,
    pub declared: u64,
    pub written: u64,
}

impl Received {
    /// False when the peer hung up before sending everything it announced.
    pub fn is_complete(&self) -> bool {
        self.written == self.declared
    }
}

/// Reads one frame off `conn` and stores the payload in `dest_dir`.
///
/// A peer that closes early leaves a short file behind and is still an `Ok`;
/// check [`Received::is_complete`]. Bytes past the announced size are never
/// written. `conn` and the file are closed on return either way.
pub fn handle_connection<S: Read>(conn: S, dest_dir: &Path) -> Result<Received> {
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, conn);
    let header = TransferHeader::read_from(&mut reader)?;

    info!(
        "creating file {:?} with size {}",
        header.file_name, header.file_size
    );
    let (path, mut file) = create_destination(dest_dir, &header.file_name)?;
    let written = copy_payload(&mut reader, &mut file, header.file_size)?;

    Ok(Received {
        file_name: header.file_name,
        path,
        declared: header.file_size,
        written,
    })
}

fn copy_payload<R: Read, W: Write>(reader: &mut R, writer: &mut W, limit: u64) -> Result<u64> {
    let mut buff = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;
    while total < limit {
        let n = match reader.read(&mut buff) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(TransferError::Read {
                    from: "data from conn",
                    source,
                })
            }
        };
        let remaining = limit - total;
        let take = if n as u64 > remaining {
            remaining as usize
        } else {
            n
        };
        writer
            .write_all(&buff[..take])
            .map_err(|source| TransferError::Write {
                to: "file data",
                source,
            })?;
        total += take as u64;
    }
    Ok(total)
}
