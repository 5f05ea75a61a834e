pub mod model;
pub mod pagination;
pub mod payload;

use thiserror::Error;

pub use model::{Definition, EntryBody, EntryKind, PartOfSpeech, RichFields, SimpleFields, WordEntry};
pub use pagination::{EntryPage, PageRequest};
pub use payload::{EntryChanges, NewEntry, SimplePatch};

/// Which entry shape the write endpoints accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySchema {
    Rich,
    Simple,
}

impl EntrySchema {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rich" | "multi" | "multi-definition" => Some(Self::Rich),
            "simple" | "single" | "single-definition" => Some(Self::Simple),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rich => "rich",
            Self::Simple => "simple",
        }
    }
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("{0}")]
    Validation(String),
    #[error("word '{0}' already exists")]
    DuplicateKey(String),
    #[error("word '{0}' not found")]
    NotFound(String),
    #[error("search term is required")]
    MissingTerm,
    #[error("stored entry '{word}' is malformed: {reason}")]
    Corrupt { word: String, reason: String },
    #[error("entry '{word}' could not be encoded: {reason}")]
    Encode { word: String, reason: String },
    #[error("entry write was interrupted: {0}")]
    Interrupted(String),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl EntryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Key form of a word: trimmed and lower-cased.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trims optional free text; blank values collapse to `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims required free text; blank or missing values yield `None`.
pub(crate) fn clean_required(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
