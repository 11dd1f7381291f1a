use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while sending or receiving a file.
///
/// Sender errors end the process. Receiver errors end only the connection
/// they happened on, except for `Connection` errors raised by the listener.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Could not establish, bind or accept a stream
    #[error("{context} {addr}: {source}")]
    Connection {
        context: &'static str,
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Header is truncated or malformed
    #[error("read {field}: {source}")]
    Framing {
        field: &'static str,
        #[source]
        source: io::Error,
    },

    /// Header parsed but the file name is unusable
    #[error("invalid file name: {0}")]
    Validation(String),

    /// Local file could not be opened, created or inspected
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read {from}: {source}")]
    Read {
        from: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("write {to}: {source}")]
    Write {
        to: &'static str,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransferError>;
