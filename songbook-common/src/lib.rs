//! # Songbook Common Library
//!
//! Shared code for the songbook service:
//! - Song and flag stores backed by the filesystem
//! - Directive scanning and rewriting (title, key, reviewed)
//! - Chord-pro parsing and the songs index builder
//! - Configuration loading
//! - Slug generation

pub mod chordpro;
pub mod config;
pub mod directive;
pub mod error;
pub mod flags;
pub mod index;
pub mod slug;
pub mod songs;

pub use error::{Error, Result};
pub use flags::FlagStore;
pub use slug::slugify;
pub use songs::SongStore;
