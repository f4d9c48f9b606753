//! Chord-pro song parsing
//!
//! Produces the structured form consumed by the songbook frontend: metadata
//! directives, named sections, and lines split into chord/lyric tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::directive::parse_flag;
use crate::slug::slugify;

/// Title used when a song has no `{title: ...}` directive
pub const DEFAULT_TITLE: &str = "Untitled";

/// Name of the implicit section before any `{section: ...}` directive
pub const DEFAULT_SECTION: &str = "Verse";

static DIRECTIVE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{\s*([^:]+):\s*(.+)\s*\}$").expect("valid directive line regex")
});

static CHORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("valid chord regex"));

/// A chord and the lyric text sung over it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongLineToken {
    pub chord: Option<String>,
    pub lyric: String,
}

/// One body line of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongLine {
    pub tokens: Vec<SongLineToken>,
    pub raw: String,
}

/// Named group of lines (verse, chorus, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSection {
    pub name: String,
    pub lines: Vec<SongLine>,
}

/// Fully parsed song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSong {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub reviewed: bool,
    pub sections: Vec<SongSection>,
    pub source_path: String,
}

/// Split a body line into chord/lyric tokens.
///
/// Every `[chord]` owns the lyric text up to the next `[`. Text before the
/// first chord becomes a chordless token. A line without tokens yields a
/// single empty token.
pub fn parse_tokens(line: &str) -> Vec<SongLineToken> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in CHORD_RE.captures_iter(line) {
        let (Some(whole), Some(chord)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        if whole.start() > last {
            tokens.push(SongLineToken {
                chord: None,
                lyric: line[last..whole.start()].to_string(),
            });
        }

        let remaining = &line[whole.end()..];
        let lyric = match remaining.find('[') {
            Some(next) => &remaining[..next],
            None => remaining,
        };

        tokens.push(SongLineToken {
            chord: Some(chord.as_str().trim().to_string()),
            lyric: lyric.to_string(),
        });
        last = whole.end() + lyric.len();
    }

    let trailing = &line[last..];
    if !trailing.trim().is_empty() {
        tokens.push(SongLineToken {
            chord: None,
            lyric: trailing.to_string(),
        });
    }

    if tokens.is_empty() {
        tokens.push(SongLineToken {
            chord: None,
            lyric: String::new(),
        });
    }

    tokens
}

/// Parse raw song content. `source_path` is recorded verbatim.
pub fn parse(raw: &str, source_path: &str) -> ParsedSong {
    let mut title = DEFAULT_TITLE.to_string();
    let mut key = None;
    let mut reviewed = false;
    let mut sections = Vec::new();
    let mut current = SongSection {
        name: DEFAULT_SECTION.to_string(),
        lines: Vec::new(),
    };

    for line in raw.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)) {
        if let Some(caps) = DIRECTIVE_LINE_RE.captures(line) {
            let tag = caps[1].trim().to_lowercase();
            let value = caps[2].trim().to_string();
            match tag.as_str() {
                "title" => title = value,
                "key" => key = Some(value),
                "reviewed" => reviewed = parse_flag(&value),
                "section" => {
                    let next = SongSection {
                        name: value,
                        lines: Vec::new(),
                    };
                    let finished = std::mem::replace(&mut current, next);
                    if !finished.lines.is_empty() {
                        sections.push(finished);
                    }
                }
                _ => {}
            }
            continue;
        }

        if line.trim().is_empty() {
            current.lines.push(SongLine {
                tokens: vec![SongLineToken {
                    chord: None,
                    lyric: String::new(),
                }],
                raw: String::new(),
            });
            continue;
        }

        current.lines.push(SongLine {
            tokens: parse_tokens(line),
            raw: line.to_string(),
        });
    }

    if !current.lines.is_empty() {
        sections.push(current);
    }

    ParsedSong {
        id: slugify(&title),
        title,
        key,
        reviewed,
        sections,
        source_path: source_path.to_string(),
    }
}
