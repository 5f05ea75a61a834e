use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::model::{Definition, EntryBody, PartOfSpeech, RichFields, SimpleFields, WordEntry};
use super::{clean_optional, clean_required, normalize_word, EntryError, EntrySchema};

const RICH_REQUIRED: &str = "Word, pronunciation, and at least one definition are required";
const SIMPLE_REQUIRED: &str = "Word and definition are required";

/// A validated entry ready to insert. `word` is already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub word: String,
    pub body: EntryBody,
}

/// A validated update.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryChanges {
    /// Full replacement of word and body.
    Replace(NewEntry),
    /// Field-wise patch of a single-definition entry.
    Patch(SimplePatch),
}

/// Outer `None` leaves a field untouched; `Some(None)` clears an optional one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimplePatch {
    pub word: Option<String>,
    pub definition: Option<String>,
    pub part_of_speech: Option<Option<PartOfSpeech>>,
    pub example: Option<Option<String>>,
    pub etymology: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichEntryPayload {
    pub word: Option<String>,
    pub pronunciation: Option<String>,
    pub definitions: Option<Vec<DefinitionPayload>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DefinitionPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub definition: Option<String>,
    pub example: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleEntryPayload {
    pub word: Option<String>,
    pub definition: Option<String>,
    pub part_of_speech: Option<String>,
    pub example: Option<String>,
    pub etymology: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplePatchPayload {
    #[serde(default, deserialize_with = "present")]
    pub word: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub definition: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub part_of_speech: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub example: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub etymology: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Parses and validates a create body for the configured schema.
pub fn parse_new_entry(schema: EntrySchema, body: &[u8]) -> Result<NewEntry, EntryError> {
    match schema {
        EntrySchema::Rich => decode::<RichEntryPayload>(body)?.validate(),
        EntrySchema::Simple => decode::<SimpleEntryPayload>(body)?.validate(),
    }
}

/// Parses and validates an update body for the configured schema.
pub fn parse_changes(schema: EntrySchema, body: &[u8]) -> Result<EntryChanges, EntryError> {
    match schema {
        EntrySchema::Rich => decode::<RichEntryPayload>(body)?
            .validate()
            .map(EntryChanges::Replace),
        EntrySchema::Simple => decode::<SimplePatchPayload>(body)?
            .validate()
            .map(EntryChanges::Patch),
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, EntryError> {
    serde_json::from_slice(body)
        .map_err(|err| EntryError::validation(format!("Invalid request body: {err}")))
}

impl RichEntryPayload {
    pub fn validate(self) -> Result<NewEntry, EntryError> {
        let word = clean_required(self.word.as_deref()).map(|w| normalize_word(&w));
        let pronunciation = clean_required(self.pronunciation.as_deref());
        let definitions = self.definitions.unwrap_or_default();

        let (Some(word), Some(pronunciation)) = (word, pronunciation) else {
            return Err(EntryError::validation(RICH_REQUIRED));
        };
        if definitions.is_empty() {
            return Err(EntryError::validation(RICH_REQUIRED));
        }

        let definitions = definitions
            .into_iter()
            .enumerate()
            .map(|(index, def)| def.validate(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewEntry {
            word,
            body: EntryBody::Rich(RichFields {
                pronunciation,
                definitions,
            }),
        })
    }
}

impl DefinitionPayload {
    fn validate(self, index: usize) -> Result<Definition, EntryError> {
        let kind = clean_required(self.kind.as_deref());
        let definition = clean_required(self.definition.as_deref());
        match (kind, definition) {
            (Some(kind), Some(definition)) => Ok(Definition {
                kind,
                definition,
                example: clean_optional(self.example),
            }),
            _ => Err(EntryError::validation(format!(
                "Definition {} requires a type and a definition",
                index + 1
            ))),
        }
    }
}

impl SimpleEntryPayload {
    pub fn validate(self) -> Result<NewEntry, EntryError> {
        let word = clean_required(self.word.as_deref()).map(|w| normalize_word(&w));
        let definition = clean_required(self.definition.as_deref());
        let (Some(word), Some(definition)) = (word, definition) else {
            return Err(EntryError::validation(SIMPLE_REQUIRED));
        };

        Ok(NewEntry {
            word,
            body: EntryBody::Simple(SimpleFields {
                definition,
                part_of_speech: parse_part_of_speech(self.part_of_speech)?,
                example: clean_optional(self.example),
                etymology: clean_optional(self.etymology),
            }),
        })
    }
}

impl SimplePatchPayload {
    pub fn validate(self) -> Result<SimplePatch, EntryError> {
        let word = match self.word {
            None => None,
            Some(raw) => match clean_required(raw.as_deref()) {
                Some(word) => Some(normalize_word(&word)),
                None => return Err(EntryError::validation("Word cannot be empty")),
            },
        };

        let definition = match self.definition {
            None => None,
            Some(raw) => match clean_required(raw.as_deref()) {
                Some(definition) => Some(definition),
                None => return Err(EntryError::validation("Definition cannot be empty")),
            },
        };

        let part_of_speech = match self.part_of_speech {
            None => None,
            Some(raw) => Some(parse_part_of_speech(raw)?),
        };

        Ok(SimplePatch {
            word,
            definition,
            part_of_speech,
            example: self.example.map(clean_optional),
            etymology: self.etymology.map(clean_optional),
        })
    }
}

fn parse_part_of_speech(raw: Option<String>) -> Result<Option<PartOfSpeech>, EntryError> {
    let Some(raw) = clean_optional(raw) else {
        return Ok(None);
    };
    PartOfSpeech::parse(&raw).map(Some).ok_or_else(|| {
        let allowed: Vec<&str> = PartOfSpeech::ALL.iter().map(PartOfSpeech::as_str).collect();
        EntryError::validation(format!(
            "Invalid partOfSpeech '{raw}'; expected one of: {}",
            allowed.join(", ")
        ))
    })
}

impl SimplePatch {
    pub fn apply(&self, current: &SimpleFields) -> SimpleFields {
        SimpleFields {
            definition: self
                .definition
                .clone()
                .unwrap_or_else(|| current.definition.clone()),
            part_of_speech: self.part_of_speech.unwrap_or(current.part_of_speech),
            example: self
                .example
                .clone()
                .unwrap_or_else(|| current.example.clone()),
            etymology: self
                .etymology
                .clone()
                .unwrap_or_else(|| current.etymology.clone()),
        }
    }
}

impl EntryChanges {
    /// Word and body that result from applying these changes to `current`.
    pub fn resolve(self, current: &WordEntry) -> Result<(String, EntryBody), EntryError> {
        match self {
            Self::Replace(entry) => Ok((entry.word, entry.body)),
            Self::Patch(patch) => match &current.body {
                EntryBody::Simple(fields) => {
                    let body = EntryBody::Simple(patch.apply(fields));
                    let word = patch.word.unwrap_or_else(|| current.word.clone());
                    Ok((word, body))
                }
                EntryBody::Rich(_) => Err(EntryError::validation(
                    "Entry has multiple definitions and cannot be patched field by field",
                )),
            },
        }
    }
}
