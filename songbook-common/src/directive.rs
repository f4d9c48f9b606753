//! Directive scanning and rewriting
//!
//! Directives are `{name: value}` tags embedded in song content. This module
//! works on raw text with regular expressions: it does not parse the song
//! into a document, so a directive split across lines is not recognized.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::Result;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\s*title\s*:\s*([^}]*)\}").expect("valid title regex"));

static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\s*key\s*:\s*([^}]*)\}").expect("valid key regex"));

static REVIEWED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{\s*reviewed\s*:\s*([^}]*)\}").expect("valid reviewed regex")
});

fn first_value(re: &Regex, content: &str) -> Option<String> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// First `{title: ...}` value in `content`, trimmed.
pub fn extract_title(content: &str) -> Option<String> {
    first_value(&TITLE_RE, content)
}

/// Value of the first `{title: ...}` directive, trimmed, even when empty.
///
/// `None` only when no title directive is present.
pub fn title_value(content: &str) -> Option<String> {
    TITLE_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// First `{key: ...}` value in `content`, trimmed.
pub fn extract_key(content: &str) -> Option<String> {
    first_value(&KEY_RE, content)
}

/// Whether `content` carries a truthy `{reviewed: ...}` directive.
pub fn extract_reviewed(content: &str) -> bool {
    first_value(&REVIEWED_RE, content)
        .map(|value| parse_flag(&value))
        .unwrap_or(false)
}

/// Interpret a directive value as a boolean (`true`, `yes`, `1`).
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

fn reviewed_directive(reviewed: bool) -> String {
    format!("{{reviewed: {}}}", reviewed)
}

/// Return `content` with its reviewed directive set to `reviewed`.
///
/// An existing `{reviewed: ...}` is rewritten in place. Otherwise a new
/// directive line goes right after the line holding `{key: ...}`, else after
/// the `{title: ...}` line, else at the top of the file.
pub fn with_reviewed(content: &str, reviewed: bool) -> String {
    let directive = reviewed_directive(reviewed);

    if REVIEWED_RE.is_match(content) {
        return REVIEWED_RE
            .replacen(content, 1, regex::NoExpand(&directive))
            .into_owned();
    }

    let anchor = KEY_RE.find(content).or_else(|| TITLE_RE.find(content));
    match anchor {
        Some(m) => insert_after_line(content, m.end(), &directive),
        None => format!("{}\n{}", directive, content),
    }
}

/// Insert `line` as a new line after the line containing byte offset `pos`.
fn insert_after_line(content: &str, pos: usize, line: &str) -> String {
    let mut out = String::with_capacity(content.len() + line.len() + 2);
    match content[pos..].find('\n') {
        Some(offset) => {
            let newline_end = pos + offset + 1;
            let eol = if content[..newline_end].ends_with("\r\n") { "\r\n" } else { "\n" };
            out.push_str(&content[..newline_end]);
            out.push_str(line);
            out.push_str(eol);
            out.push_str(&content[newline_end..]);
        }
        None => {
            out.push_str(content);
            out.push('\n');
            out.push_str(line);
        }
    }
    out
}

/// Rewrite the reviewed directive of the song file at `path`.
pub async fn set_reviewed(path: &Path, reviewed: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(path).await?;
    let updated = with_reviewed(&content, reviewed);
    tokio::fs::write(path, updated).await?;
    debug!("Set reviewed={} in {}", reviewed, path.display());
    Ok(())
}
