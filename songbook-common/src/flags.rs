//! Flag store: the set of flagged song identifiers, persisted as a JSON array
//!
//! The set is not reconciled with the songs directory; a flag may name an
//! identifier that no song carries.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::Result;

/// Flagged identifiers, kept sorted
pub type FlagSet = BTreeSet<String>;

/// JSON-file-backed flag set
#[derive(Debug)]
pub struct FlagStore {
    path: PathBuf,
    /// Serializes load-modify-save in `toggle` within this process
    write_lock: Mutex<()>,
}

impl FlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current set. A missing file is an empty set; malformed JSON is an error.
    pub async fn load(&self) -> Result<FlagSet> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FlagSet::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the persisted set with `flags`.
    pub async fn save(&self, flags: &FlagSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(flags)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Add or remove `identifier` and return the resulting set.
    pub async fn toggle(&self, identifier: &str, flagged: bool) -> Result<FlagSet> {
        let _guard = self.write_lock.lock().await;

        let mut flags = self.load().await?;
        let changed = if flagged {
            flags.insert(identifier.to_string())
        } else {
            flags.remove(identifier)
        };

        self.save(&flags).await?;
        debug!("Flag {:?} -> {} (changed: {})", identifier, flagged, changed);

        Ok(flags)
    }
}
