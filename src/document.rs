//! Raw text I/O for the edited data module.
//!
//! The whole file is one `Document` string per request: read once at the
//! start, rewritten in memory by the codecs, and stored with a single
//! atomic replace.

use crate::{
    config::EditorConfig,
    log,
    sync::{self, SyncError},
};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised while reading or storing the data file.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` not found and could not be downloaded: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: SyncError,
    },

    #[error("`{}` not found and automatic download is disabled", .0.display())]
    Missing(PathBuf),
}

/// The configured data file, bound to the configuration that locates it.
#[derive(Debug, Clone, Copy)]
pub struct DataFile<'a> {
    config: &'a EditorConfig,
}

impl<'a> DataFile<'a> {
    pub const fn new(config: &'a EditorConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.data.path
    }

    /// Load the document, downloading the default snapshot first when the file is missing.
    pub fn load(&self) -> Result<String, DocumentError> {
        let path = self.path();
        if !path.exists() {
            if !self.config.sync.auto {
                return Err(DocumentError::Missing(path.to_path_buf()));
            }
            log!("sync"; "`{}` missing, fetching snapshot", path.display());
            let sync_config = &self.config.sync;
            sync::sync(self.config, &sync_config.repo, &sync_config.branch).map_err(
                |source| DocumentError::Unavailable {
                    path: path.to_path_buf(),
                    source,
                },
            )?;
        }
        read(path)
    }

    /// Persist a regenerated document.
    pub fn save(&self, text: &str) -> Result<(), DocumentError> {
        save(self.path(), text)?;
        log!("save"; "{} ({} bytes)", self.path().display(), text.len());
        Ok(())
    }
}

/// Read the data file as UTF-8 text.
pub fn read(path: &Path) -> Result<String, DocumentError> {
    fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `path` with `content`, creating parent directories as needed.
///
/// Content goes to a temporary file in the same directory first and is then
/// renamed over the target, so readers never observe a half-written file.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = temp_file_in(parent)?;
    tmp.write_all(content)?;
    // Replacing a file keeps its mode
    match fs::metadata(path) {
        Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Temporary file that a new target inherits its mode from.
///
/// `NamedTempFile` defaults to owner-only access; new files get the same
/// mode `File::create` would give them under the process umask.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Write `content` only if the file is missing or differs byte-for-byte.
///
/// Returns `true` when a write happened.
pub fn write_if_changed(path: &Path, content: &[u8]) -> io::Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == content => return Ok(false),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    write_atomic(path, content)?;
    Ok(true)
}

/// Store a regenerated document, attaching the path to any failure.
pub fn save(path: &Path, text: &str) -> Result<(), DocumentError> {
    write_atomic(path, text.as_bytes()).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Content revision of a document: hex `blake3` digest of its text.
///
/// The edit form echoes the revision it was rendered from, and saves are
/// refused when the file on disk no longer has that revision.
pub fn revision(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}
