use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::ExportResult;
use crate::util::time;

pub const DEFAULT_FILE_PREFIX: &str = "DrawingApp";

/// Destination for exported PNG bytes
pub trait ExportStore: Send + Sync {
    /// Write `png` somewhere durable and return where it went
    fn persist(&self, png: &[u8]) -> ExportResult<PathBuf>;
}

/// Writes exports into an application-owned directory,
/// named `<prefix><unix seconds>.png`
#[derive(Debug, Clone)]
pub struct CacheDirStore {
    directory: PathBuf,
    prefix: String,
}

impl CacheDirStore {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    /// `<platform cache dir>/DrawingApp`, falling back to the temp dir
    pub fn default_directory() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(DEFAULT_FILE_PREFIX)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `png` under the first free name for `timestamp`.
    ///
    /// Names are claimed with `create_new`, so an existing file is never replaced.
    fn persist_at(&self, png: &[u8], timestamp: u64) -> ExportResult<PathBuf> {
        let mut attempt = None;
        loop {
            let path = self
                .directory
                .join(file_name(&self.prefix, timestamp, attempt));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    attempt = Some(attempt.map_or(1, |n| n + 1));
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            // A failed write must not leave a truncated image behind
            if let Err(err) = file.write_all(png).and_then(|_| file.sync_all()) {
                drop(file);
                let _ = fs::remove_file(&path);
                return Err(err.into());
            }
            return Ok(path);
        }
    }
}

impl Default for CacheDirStore {
    fn default() -> Self {
        Self::new(Self::default_directory(), DEFAULT_FILE_PREFIX)
    }
}

pub fn file_name(prefix: &str, timestamp: u64, attempt: Option<u32>) -> String {
    match attempt {
        Some(n) => format!("{prefix}{timestamp}-{n}.png"),
        None => format!("{prefix}{timestamp}.png"),
    }
}

impl ExportStore for CacheDirStore {
    fn persist(&self, png: &[u8]) -> ExportResult<PathBuf> {
        if !self.directory.exists() {
            log::info!("Creating export directory: {}", self.directory.display());
            fs::create_dir_all(&self.directory)?;
        }

        let path = self.persist_at(png, time::timestamp_secs())?;
        log::debug!("Wrote {} bytes to {}", png.len(), path.display());
        Ok(path)
    }
}
