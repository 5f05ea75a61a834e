use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Separates searchable fields so a term never matches across two of them.
const SEARCH_FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub id: String,
    pub word: String,
    #[serde(flatten)]
    pub body: EntryBody,
    pub date_added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryBody {
    Rich(RichFields),
    Simple(SimpleFields),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichFields {
    pub pronunciation: String,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(rename = "type")]
    pub kind: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleFields {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<PartOfSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etymology: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 8] = [
        Self::Noun,
        Self::Verb,
        Self::Adjective,
        Self::Adverb,
        Self::Pronoun,
        Self::Preposition,
        Self::Conjunction,
        Self::Interjection,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|pos| pos.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Pronoun => "pronoun",
            Self::Preposition => "preposition",
            Self::Conjunction => "conjunction",
            Self::Interjection => "interjection",
        }
    }
}

/// Storage tag for the document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Rich,
    Simple,
}

impl EntryKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rich" => Some(Self::Rich),
            "simple" => Some(Self::Simple),
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

impl EntryBody {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Rich(_) => EntryKind::Rich,
            Self::Simple(_) => EntryKind::Simple,
        }
    }

    /// Lower-cased text that substring search runs against, word first.
    ///
    /// Rich entries are searchable by definition and example text as well;
    /// simple entries only by word.
    pub fn search_text(&self, word: &str) -> String {
        let mut fields = vec![word.to_lowercase()];
        if let Self::Rich(rich) = self {
            for def in &rich.definitions {
                fields.push(def.definition.to_lowercase());
                if let Some(example) = &def.example {
                    fields.push(example.to_lowercase());
                }
            }
        }
        fields.join(&SEARCH_FIELD_SEPARATOR.to_string())
    }
}

/// Current time at the precision the store keeps.
pub fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamp for a mutation of a record last modified at `previous`.
///
/// Always strictly later than `previous`, even when the clock has not moved
/// past it at microsecond resolution.
pub fn next_modification(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_timestamp();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
