//! Remote sync: refresh cards.js and cataclysm images from a repository snapshot.
//!
//! The snapshot is the zip archive the hosting service produces for a branch.
//! Its first entry names the single root directory (`<repo>-<branch>/`); the
//! data member and every file below the assets member are copied out of it.
//! A local file is only rewritten when it is new or differs byte-for-byte,
//! so a second sync without remote changes reports nothing changed.

use crate::{config::EditorConfig, document, log};
use std::{
    io::{self, Cursor, Read},
    path::{Component, Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use zip::{ZipArchive, result::ZipError};

/// User agent sent with archive downloads.
const USER_AGENT: &str = concat!("cards-editor/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Zip extraction error: {0}")]
    Zip(#[from] ZipError),

    #[error("IO error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive is empty")]
    EmptyArchive,

    #[error("archive entry `{0}` escapes the target directory")]
    UnsafeEntry(String),
}

/// Where archive members come from and where they land.
#[derive(Debug, Clone, Copy)]
pub struct SyncTargets<'a> {
    /// Local data file.
    pub data_path: &'a Path,
    /// Local image mirror.
    pub assets_dir: &'a Path,
    /// Data file path below the archive root.
    pub data_member: &'a str,
    /// Image directory below the archive root.
    pub assets_member: &'a str,
}

impl<'a> SyncTargets<'a> {
    pub fn from_config(config: &'a EditorConfig) -> Self {
        Self {
            data_path: &config.data.path,
            assets_dir: &config.data.assets,
            data_member: &config.sync.data_member,
            assets_member: &config.sync.assets_member,
        }
    }
}

/// Files written by one sync run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub changed: Vec<PathBuf>,
}

impl SyncReport {
    /// Number of files actually written.
    pub fn count(&self) -> usize {
        self.changed.len()
    }
}

/// Download the snapshot of `repo`/`branch` and apply it to the configured targets.
pub fn sync(config: &EditorConfig, repo: &str, branch: &str) -> Result<SyncReport, SyncError> {
    let url = config.sync.archive_url_for(repo, branch);
    log!("sync"; "downloading {repo}@{branch}");

    let bytes = download_archive(&url, config.sync.timeout())?;
    let report = sync_archive(&bytes, &SyncTargets::from_config(config))?;

    log!("sync"; "{repo}@{branch}: {} files changed", report.count());
    Ok(report)
}

/// Fetch an archive into memory.
pub fn download_archive(url: &str, timeout: Duration) -> Result<Vec<u8>, SyncError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;

    let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
    Ok(bytes.to_vec())
}

/// Copy the data member and the assets tree out of an in-memory archive.
pub fn sync_archive(bytes: &[u8], targets: &SyncTargets) -> Result<SyncReport, SyncError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.len() == 0 {
        return Err(SyncError::EmptyArchive);
    }

    let root = {
        let first = archive.by_index(0)?;
        first.name().split('/').next().unwrap_or_default().to_owned()
    };

    let mut report = SyncReport::default();

    // Data file
    let data_member = format!("{root}/{}", targets.data_member);
    match archive.by_name(&data_member) {
        Ok(mut entry) => {
            let content = read_entry(&mut entry, targets.data_path)?;
            if write(targets.data_path, &content)? {
                report.changed.push(targets.data_path.to_path_buf());
            }
        }
        Err(ZipError::FileNotFound) => {
            log!("sync"; "`{data_member}` not in archive, data file left as is");
        }
        Err(err) => return Err(err.into()),
    }

    // Assets tree
    let assets_prefix = format!("{root}/{}/", targets.assets_member.trim_end_matches('/'));
    std::fs::create_dir_all(targets.assets_dir).map_err(|source| SyncError::Io {
        path: targets.assets_dir.to_path_buf(),
        source,
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_owned();
        let Some(relative) = name.strip_prefix(&assets_prefix) else {
            continue;
        };
        if relative.is_empty() {
            continue;
        }
        if !is_contained(relative) {
            return Err(SyncError::UnsafeEntry(name));
        }

        let target = targets.assets_dir.join(relative);
        let content = read_entry(&mut entry, &target)?;
        if write(&target, &content)? {
            report.changed.push(target);
        }
    }

    Ok(report)
}

/// Relative member path that stays inside its directory.
fn is_contained(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

fn read_entry(entry: &mut impl Read, target: &Path) -> Result<Vec<u8>, SyncError> {
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|source| SyncError::Io {
            path: target.to_path_buf(),
            source,
        })?;
    Ok(content)
}

fn write(target: &Path, content: &[u8]) -> Result<bool, SyncError> {
    document::write_if_changed(target, content).map_err(|source| SyncError::Io {
        path: target.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Write};
    use tempfile::TempDir;
    use zip::{ZipWriter, write::SimpleFileOptions};

    const DATA: &str = "const GENDERS = ['Мужской'];\n\nmodule.exports = { GENDERS };\n";

    /// Build an archive shaped like a branch snapshot.
    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.add_directory("YGsere-main/", options).unwrap();
        for (name, content) in entries {
            writer.start_file(format!("YGsere-main/{name}"), options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    struct Fixture {
        _dir: TempDir,
        data_path: PathBuf,
        assets_dir: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let data_path = dir.path().join("data").join("cards.js");
            let assets_dir = dir.path().join("public").join("cataclysms");
            Self {
                _dir: dir,
                data_path,
                assets_dir,
            }
        }

        fn targets(&self) -> SyncTargets<'_> {
            SyncTargets {
                data_path: &self.data_path,
                assets_dir: &self.assets_dir,
                data_member: "data/cards.js",
                assets_member: "client/public/cataclysms",
            }
        }
    }

    #[test]
    fn test_sync_writes_then_is_idempotent() {
        let fixture = Fixture::new();
        let bytes = archive(&[
            ("data/cards.js", DATA),
            ("client/public/cataclysms/fire.jpg", "fire-v1"),
            ("client/other/readme.md", "ignored"),
        ]);

        let first = sync_archive(&bytes, &fixture.targets()).unwrap();
        assert_eq!(first.count(), 2);
        assert_eq!(fs::read_to_string(&fixture.data_path).unwrap(), DATA);
        assert_eq!(
            fs::read(fixture.assets_dir.join("fire.jpg")).unwrap(),
            b"fire-v1"
        );
        assert!(!fixture.assets_dir.join("readme.md").exists());

        let second = sync_archive(&bytes, &fixture.targets()).unwrap();
        assert_eq!(second.count(), 0);
    }

    #[test]
    fn test_sync_counts_only_changed_files() {
        let fixture = Fixture::new();
        let v1 = archive(&[
            ("data/cards.js", DATA),
            ("client/public/cataclysms/fire.jpg", "v1"),
        ]);
        sync_archive(&v1, &fixture.targets()).unwrap();

        let v2 = archive(&[
            ("data/cards.js", DATA),
            ("client/public/cataclysms/fire.jpg", "v2"),
            ("client/public/cataclysms/flood/big.png", "png"),
        ]);
        let report = sync_archive(&v2, &fixture.targets()).unwrap();
        assert_eq!(report.count(), 2);
        assert!(report.changed.contains(&fixture.assets_dir.join("fire.jpg")));
        assert!(fixture.assets_dir.join("flood").join("big.png").is_file());
    }

    #[test]
    fn test_sync_without_data_member() {
        let fixture = Fixture::new();
        let bytes = archive(&[("client/public/cataclysms/a.png", "a")]);

        let report = sync_archive(&bytes, &fixture.targets()).unwrap();
        assert_eq!(report.count(), 1);
        assert!(!fixture.data_path.exists());
    }

    #[test]
    fn test_sync_rejects_escaping_entry() {
        let fixture = Fixture::new();
        let bytes = archive(&[("client/public/cataclysms/../../evil.js", "x")]);

        let err = sync_archive(&bytes, &fixture.targets()).unwrap_err();
        assert!(matches!(err, SyncError::UnsafeEntry(_)));
    }

    #[test]
    fn test_sync_rejects_garbage() {
        let fixture = Fixture::new();
        let err = sync_archive(b"not a zip", &fixture.targets()).unwrap_err();
        assert!(matches!(err, SyncError::Zip(_)));
    }

    #[test]
    fn test_sync_rejects_empty_archive() {
        let fixture = Fixture::new();
        let bytes = ZipWriter::new(Cursor::new(Vec::new()))
            .finish()
            .unwrap()
            .into_inner();
        let err = sync_archive(&bytes, &fixture.targets()).unwrap_err();
        assert!(matches!(err, SyncError::EmptyArchive));
    }
}
