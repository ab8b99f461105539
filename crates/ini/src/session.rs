//! Buffered per-file INI session
//!
//! Reads load each file once into memory; writes mutate the cached
//! document and mark it dirty. Nothing reaches disk until [`IniSession::flush`],
//! which writes every dirty file concurrently, one task per file. Files are
//! independent, so there is no ordering across files and no atomicity: a
//! failure part way through can leave some files written and others not.

use crate::document::IniDocument;
use crate::error::{IniError, Result};
use crate::layout::IniLayout;
use asm_core::IniFile;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct CachedFile {
    document: IniDocument,
    dirty: bool,
}

/// Session dictionary of open INI files
pub struct IniSession {
    layout: IniLayout,
    files: DashMap<IniFile, CachedFile>,
}

impl IniSession {
    pub fn new(layout: IniLayout) -> Self {
        Self {
            layout,
            files: DashMap::new(),
        }
    }

    pub fn layout(&self) -> &IniLayout {
        &self.layout
    }

    /// Run `f` against the cached file, loading it from disk on first use
    fn with_file<R>(&self, file: IniFile, f: impl FnOnce(&mut CachedFile) -> R) -> Result<R> {
        let mut cached = match self.files.entry(file) {
            MapEntry::Occupied(entry) => entry.into_ref(),
            MapEntry::Vacant(entry) => {
                let document = read_document(&self.layout.path(file))?;
                entry.insert(CachedFile {
                    document,
                    dirty: false,
                })
            }
        };
        Ok(f(cached.value_mut()))
    }

    fn modify<R>(&self, file: IniFile, f: impl FnOnce(&mut IniDocument) -> R) -> Result<R> {
        self.with_file(file, |cached| {
            cached.dirty = true;
            f(&mut cached.document)
        })
    }

    /// Every `key=value` line of a section, duplicates included
    pub fn read_section(&self, file: IniFile, section: &str) -> Result<Vec<String>> {
        self.with_file(file, |cached| cached.document.read_section(section))
    }

    /// Replace a section's entire entry list
    pub fn write_section<S: AsRef<str>>(
        &self,
        file: IniFile,
        section: &str,
        values: &[S],
    ) -> Result<()> {
        self.modify(file, |document| document.write_section(section, values))
    }

    /// First value of `key`, or empty when the file, section or key is absent
    pub fn read_value(&self, file: IniFile, section: &str, key: &str) -> Result<String> {
        self.with_file(file, |cached| cached.document.read_value(section, key))
    }

    /// Write `key`, or delete all of its occurrences when `value` is `None`
    pub fn write_key(
        &self,
        file: IniFile,
        section: &str,
        key: &str,
        value: Option<&str>,
    ) -> Result<()> {
        self.modify(file, |document| document.write_key(section, key, value))
    }

    /// Delete `key` and every `key[i]` entry from a section
    pub fn remove_keys(&self, file: IniFile, section: &str, key: &str) -> Result<usize> {
        self.modify(file, |document| {
            document
                .section_mut(section)
                .map(|section| section.remove_collection(key))
                .unwrap_or(0)
        })
    }

    /// Erase every entry of a section, keeping the (empty) header
    pub fn clear_section(&self, file: IniFile, section: &str) -> Result<()> {
        self.modify(file, |document| document.section_or_insert(section).clear())
    }

    /// Names of every section in a file, in file order
    pub fn section_names(&self, file: IniFile) -> Result<Vec<String>> {
        self.with_file(file, |cached| cached.document.section_names())
    }

    pub fn is_dirty(&self, file: IniFile) -> bool {
        self.files.get(&file).map(|cached| cached.dirty).unwrap_or(false)
    }

    /// Write every dirty file to disk, concurrently.
    ///
    /// Returns the number of files written. On failure the first error is
    /// returned after all tasks have finished; files that did get written
    /// are marked clean.
    pub async fn flush(&self) -> Result<usize> {
        let pending: Vec<(IniFile, PathBuf, String)> = self
            .files
            .iter()
            .filter(|cached| cached.dirty)
            .map(|cached| {
                let file = *cached.key();
                (file, self.layout.path(file), cached.document.render())
            })
            .collect();

        let mut tasks = JoinSet::new();
        for (file, path, content) in pending {
            tasks.spawn(async move { write_file(path, content).await.map(|()| file) });
        }

        let mut written = 0;
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(file)) => {
                    if let Some(mut cached) = self.files.get_mut(&file) {
                        cached.dirty = false;
                    }
                    written += 1;
                }
                Ok(Err(err)) => {
                    warn!("INI flush failed: {}", err);
                    first_error.get_or_insert(err);
                }
                Err(err) => {
                    warn!("INI flush task failed: {}", err);
                    first_error.get_or_insert(IniError::Flush(err.to_string()));
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!("Flushed {} INI file(s) to {}", written, self.layout.config_dir.display());
                Ok(written)
            }
        }
    }
}

/// Read a document; a missing file is an empty document
fn read_document(path: &Path) -> Result<IniDocument> {
    match fs::File::open(path) {
        Ok(file) => {
            let document = IniDocument::from_reader(BufReader::new(file)).map_err(|source| {
                IniError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            debug!(
                "Loaded {} ({} sections)",
                path.display(),
                document.sections().len()
            );
            Ok(document)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("{} not found, starting from an empty file", path.display());
            Ok(IniDocument::new())
        }
        Err(source) => Err(IniError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn write_file(path: PathBuf, content: String) -> Result<()> {
    let created = match path.parent() {
        Some(parent) => tokio::fs::create_dir_all(parent).await,
        None => Ok(()),
    };
    let written = match created {
        Ok(()) => tokio::fs::write(&path, content.as_bytes()).await,
        Err(err) => Err(err),
    };

    match written {
        Ok(()) => {
            debug!("Wrote {} ({} bytes)", path.display(), content.len());
            Ok(())
        }
        Err(source) => Err(IniError::Write { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_in(dir: &Path) -> IniSession {
        IniSession::new(IniLayout::new(dir))
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = session_in(temp_dir.path());

        assert!(session
            .read_section(IniFile::Game, "/script/shootergame.shootergamemode")
            .unwrap()
            .is_empty());
        assert_eq!(
            session
                .read_value(IniFile::GameUserSettings, "ServerSettings", "ServerPassword")
                .unwrap(),
            ""
        );
        assert!(!session.is_dirty(IniFile::Game));
    }

    #[test]
    fn test_writes_are_buffered_until_flush() {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = session_in(temp_dir.path());

        session
            .write_key(IniFile::GameUserSettings, "ServerSettings", "MaxPlayers", Some("70"))
            .unwrap();

        assert!(session.is_dirty(IniFile::GameUserSettings));
        assert!(!temp_dir.path().join("GameUserSettings.ini").exists());
        assert_eq!(
            session
                .read_value(IniFile::GameUserSettings, "ServerSettings", "MaxPlayers")
                .unwrap(),
            "70"
        );
    }

    #[tokio::test]
    async fn test_flush_writes_every_dirty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_dir = temp_dir.path().join("nested/config");
        let session = session_in(&config_dir);

        session
            .write_section(IniFile::GameUserSettings, "ServerSettings", &["MaxPlayers=70"])
            .unwrap();
        session
            .write_key(
                IniFile::Game,
                "/script/shootergame.shootergamemode",
                "bUseCorpseLocator",
                Some("True"),
            )
            .unwrap();

        assert_eq!(session.flush().await.unwrap(), 2);
        assert!(!session.is_dirty(IniFile::Game));

        let gus = fs::read_to_string(config_dir.join("GameUserSettings.ini")).unwrap();
        assert_eq!(gus, "[ServerSettings]\nMaxPlayers=70\n");
        let game = fs::read_to_string(config_dir.join("Game.ini")).unwrap();
        assert_eq!(
            game,
            "[/script/shootergame.shootergamemode]\nbUseCorpseLocator=True\n"
        );

        // Nothing dirty the second time round.
        assert_eq!(session.flush().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_existing_file_is_updated_in_place() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("GameUserSettings.ini"),
            "[ServerSettings]\nA=1\nB=2\n\n[Custom]\nZ=9\n",
        )
        .unwrap();

        let session = session_in(temp_dir.path());
        session
            .write_key(IniFile::GameUserSettings, "ServerSettings", "A", None)
            .unwrap();
        session.flush().await.unwrap();

        let text = fs::read_to_string(temp_dir.path().join("GameUserSettings.ini")).unwrap();
        assert_eq!(text, "[ServerSettings]\nB=2\n\n[Custom]\nZ=9\n");
    }

    #[test]
    fn test_remove_keys_and_clear_section() {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = session_in(temp_dir.path());
        session
            .write_section(
                IniFile::GameUserSettings,
                "ServerSettings",
                &["Stat[0]=1", "Stat[1]=2", "Stat=3", "Other=4"],
            )
            .unwrap();

        let removed = session
            .remove_keys(IniFile::GameUserSettings, "ServerSettings", "Stat")
            .unwrap();
        assert_eq!(removed, 3);

        session
            .clear_section(IniFile::GameUserSettings, "ServerSettings")
            .unwrap();
        assert!(session
            .read_section(IniFile::GameUserSettings, "ServerSettings")
            .unwrap()
            .is_empty());
        assert_eq!(
            session.section_names(IniFile::GameUserSettings).unwrap(),
            vec!["ServerSettings"]
        );
    }
}
