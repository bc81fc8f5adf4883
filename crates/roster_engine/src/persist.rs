use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use roster_logging::{roster_debug, roster_info};
use tempfile::Builder;
use thiserror::Error;

use crate::filename::sanitize_filename;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} exists and is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create output directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Creates `dir` when missing; fails when the path is taken by something else.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
            roster_debug!("Created output directory {:?}", dir);
            Ok(())
        }
        Err(source) => Err(PersistError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Writes downloads into one directory. Readers never observe a half-written file.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writes `payload` to `{dir}/{filename}`, replacing any earlier download of the same name.
    pub fn write(&self, filename: &str, payload: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;
        let target = self.dir.join(filename);
        let write_err = |source| PersistError::Write {
            path: target.clone(),
            source,
        };

        let mut part = Builder::new()
            .prefix(".roster-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(write_err)?;
        part.write_all(payload).map_err(write_err)?;
        part.as_file().sync_all().map_err(write_err)?;
        part.persist(&target).map_err(|err| write_err(err.error))?;
        Ok(target)
    }
}

/// Saves a generated roster under a sanitized version of the suggested name.
pub fn save_roster(dir: &Path, suggested_name: &str, payload: &[u8]) -> Result<PathBuf, PersistError> {
    let filename = sanitize_filename(suggested_name);
    let path = AtomicFileWriter::new(dir.to_path_buf()).write(&filename, payload)?;
    roster_info!("Saved roster to {:?} ({} bytes)", path, payload.len());
    Ok(path)
}
