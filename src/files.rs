use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Result, TransferError};
use crate::protocol::base_name;

/// Opens a local file for sending; returns its base name, its length and
/// the open handle.
pub fn open_source(path: &Path) -> Result<(String, u64, File)> {
    let meta = std::fs::metadata(path).map_err(|source| TransferError::Io {
        context: "get file stat",
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(TransferError::Validation(format!("{:?} is not a regular file", path)));
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(base_name)
        .ok_or_else(|| TransferError::Validation(format!("{:?} has no usable file name", path)))?
        .to_string();
    let file = File::open(path).map_err(|source| TransferError::Io {
        context: "open file",
        path: path.to_path_buf(),
        source,
    })?;
    Ok((name, meta.len(), file))
}

/// Creates (or truncates) `name` inside `dir`.
pub fn create_destination(dir: &Path, name: &str) -> Result<(PathBuf, File)> {
    let name = base_name(name)
        .ok_or_else(|| TransferError::Validation(format!("{:?} has no base name", name)))?;
    let path = dir.join(name);
    let file = File::create(&path).map_err(|source| TransferError::Io {
        context: "create file",
        path: path.clone(),
        source,
    })?;
    Ok((path, file))
}
