//! Songs index builder
//!
//! Writes one JSON document per song to `<output>/songs/<id>.json` and a
//! summary list to `<output>/songs.index.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chordpro::{self, ParsedSong};
use crate::{Result, SongStore};

/// Summary entry in `songs.index.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub reviewed: bool,
    /// Non-blank raw body lines, in order
    pub sections: Vec<String>,
}

impl From<&ParsedSong> for IndexEntry {
    fn from(song: &ParsedSong) -> Self {
        Self {
            id: song.id.clone(),
            title: song.title.clone(),
            key: song.key.clone(),
            reviewed: song.reviewed,
            sections: song
                .sections
                .iter()
                .flat_map(|section| section.lines.iter())
                .filter(|line| !line.raw.trim().is_empty())
                .map(|line| line.raw.clone())
                .collect(),
        }
    }
}

/// Parse every song in `store` and write the index under `output_dir`.
///
/// `source_path` values are recorded relative to `base_dir` when possible.
/// Returns the number of songs written.
pub async fn build_index(store: &SongStore, base_dir: &Path, output_dir: &Path) -> Result<usize> {
    let songs_out = output_dir.join("songs");
    tokio::fs::create_dir_all(&songs_out).await?;

    let filenames = store.list().await?;
    let mut index = Vec::with_capacity(filenames.len());

    for filename in &filenames {
        let Some(raw) = store.read_for_scan(filename).await? else {
            continue;
        };
        let path = store.dir().join(filename);
        let source_path = path.strip_prefix(base_dir).unwrap_or(&path);
        let song = chordpro::parse(&raw, &source_path.to_string_lossy());

        let json = serde_json::to_string_pretty(&song)?;
        tokio::fs::write(songs_out.join(format!("{}.json", song.id)), json).await?;
        index.push(IndexEntry::from(&song));
    }

    let json = serde_json::to_string_pretty(&index)?;
    tokio::fs::write(output_dir.join("songs.index.json"), json).await?;

    info!("Built {} song(s) into {}", index.len(), output_dir.display());
    Ok(index.len())
}
