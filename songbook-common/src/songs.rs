//! Song store: a directory of `.pro` files
//!
//! The filesystem is the source of truth. Every filename accepted here is a
//! single path component ending in `.pro`; names carrying `/`, `\` or `..`
//! are rejected before any filesystem access.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::chordpro::DEFAULT_TITLE;
use crate::directive::{extract_title, title_value};
use crate::slug::{slugify, song_filename, suffixed_filename, SONG_EXTENSION};
use crate::{Error, Result};

/// Upper bound on `-N` suffixes tried by [`SongStore::create`]
const MAX_COLLISION_SUFFIX: usize = 10_000;

/// Reject filenames that could address anything but a song in the songs directory.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return Err(Error::InvalidInput(format!("Invalid filename: {:?}", filename)));
    }

    if !filename.ends_with(SONG_EXTENSION) {
        return Err(Error::InvalidInput(format!(
            "Invalid filename: {:?} (expected a {} file)",
            filename, SONG_EXTENSION
        )));
    }

    Ok(())
}

/// Filesystem-backed song collection
#[derive(Debug, Clone)]
pub struct SongStore {
    dir: PathBuf,
}

impl SongStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Songs directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Song filenames, sorted. A missing directory is an empty collection.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Songs directory {} does not exist", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut songs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) if name.ends_with(SONG_EXTENSION) => name,
                Ok(_) => continue,
                Err(name) => {
                    warn!("Skipping non UTF-8 filename {:?}", name);
                    continue;
                }
            };

            // follows symlinks; directories and dangling links are not songs
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => songs.push(name),
                Ok(_) => debug!("Skipping {}: not a regular file", name),
                Err(e) => warn!("Skipping {}: {}", name, e),
            }
        }

        songs.sort();
        Ok(songs)
    }

    /// Content of one song.
    pub async fn read(&self, filename: &str) -> Result<String> {
        validate_filename(filename)?;
        let path = self.resolve_existing(filename).await?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Song not found: {}", filename)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Content of a listed song for directory scans.
    ///
    /// `Ok(None)` for files that are not UTF-8 text or vanished since the
    /// listing, so one bad file does not fail the whole scan.
    pub async fn read_for_scan(&self, filename: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.dir.join(filename)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("Skipping {}: not valid UTF-8", filename);
                Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Skipping {}: removed during scan", filename);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite an existing song.
    pub async fn update(&self, filename: &str, content: &str) -> Result<()> {
        validate_filename(filename)?;
        let path = self.resolve_existing(filename).await?;

        tokio::fs::write(&path, content).await?;
        info!("Updated song {}", filename);
        Ok(())
    }

    /// Store a new song under a filename derived from its title.
    ///
    /// Collisions get `-1`, `-2`, ... suffixes. Each candidate is opened
    /// with create-new, so an existing file is never overwritten.
    pub async fn create(&self, content: &str) -> Result<String> {
        let title = title_value(content).ok_or_else(|| {
            Error::InvalidInput("Song content must include a {title: ...} directive".to_string())
        })?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let base = song_filename(&title);
        for n in 0..=MAX_COLLISION_SUFFIX {
            let filename = if n == 0 {
                base.clone()
            } else {
                suffixed_filename(&base, n)
            };

            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&filename))
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(content.as_bytes()).await?;
                    file.flush().await?;
                    info!("Created song {} (title {:?})", filename, title);
                    return Ok(filename);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Internal(format!(
            "No free filename for {} after {} attempts",
            base, MAX_COLLISION_SUFFIX
        )))
    }

    /// Path of the first song whose title slugifies to `identifier`.
    ///
    /// Songs without a title directive are matched as `Untitled`, the same
    /// id the index builder assigns them.
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<PathBuf>> {
        for filename in self.list().await? {
            let Some(content) = self.read_for_scan(&filename).await? else {
                continue;
            };
            let title = extract_title(&content).unwrap_or_else(|| DEFAULT_TITLE.to_string());

            if slugify(&title) == identifier {
                return Ok(Some(self.dir.join(&filename)));
            }
        }

        Ok(None)
    }

    /// Resolve `filename` to an existing file strictly inside the songs directory.
    async fn resolve_existing(&self, filename: &str) -> Result<PathBuf> {
        let mut components = Path::new(filename).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            return Err(Error::Forbidden(format!("Invalid file path: {}", filename)));
        }

        let not_found = || Error::NotFound(format!("Song not found: {}", filename));

        let root = match tokio::fs::canonicalize(&self.dir).await {
            Ok(root) => root,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        let resolved = match tokio::fs::canonicalize(self.dir.join(filename)).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        if resolved.parent() != Some(root.as_path()) {
            warn!("Rejected {}: resolves to {}", filename, resolved.display());
            return Err(Error::Forbidden(format!("Invalid file path: {}", filename)));
        }

        Ok(resolved)
    }
}
