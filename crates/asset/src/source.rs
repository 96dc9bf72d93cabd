//! Whole-file reads with a size ceiling.

use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Largest asset source accepted, in bytes.
pub const MAX_SOURCE_LEN: u64 = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{} is {len} bytes, the limit is {}", path.display(), MAX_SOURCE_LEN)]
    TooLarge { path: PathBuf, len: u64 },
}

/// Read a whole file into memory, refusing anything over [`MAX_SOURCE_LEN`].
pub fn read_source(path: impl AsRef<Path>) -> Result<Vec<u8>, SourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_owned(),
        source,
    })?;
    let read_err = |source| SourceError::Read {
        path: path.to_owned(),
        source,
    };

    let len = file.metadata().map_err(read_err)?.len();
    if len > MAX_SOURCE_LEN {
        return Err(SourceError::TooLarge {
            path: path.to_owned(),
            len,
        });
    }

    // The file may grow between stat and read; never take more than the limit + 1.
    let mut bytes = Vec::with_capacity(len as usize);
    file.take(MAX_SOURCE_LEN + 1)
        .read_to_end(&mut bytes)
        .map_err(read_err)?;
    if bytes.len() as u64 > MAX_SOURCE_LEN {
        return Err(SourceError::TooLarge {
            path: path.to_owned(),
            len: bytes.len() as u64,
        });
    }

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("asset-source-{}-{}", std::process::id(), name))
    }

    #[test]
    fn reads_small_file() {
        let path = scratch_path("small.obj");
        std::fs::write(&path, b"v 0 0 0\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), b"v 0 0 0\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = read_source(scratch_path("does-not-exist.obj")).unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let path = scratch_path("huge.obj");
        std::fs::write(&path, vec![b'#'; MAX_SOURCE_LEN as usize + 1]).unwrap();
        let err = read_source(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, SourceError::TooLarge { len, .. } if len == MAX_SOURCE_LEN + 1));
    }
}
