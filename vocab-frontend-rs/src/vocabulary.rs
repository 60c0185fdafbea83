use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf::{Record, Shelf};

pub const LISTS_KEY: &str = "vocabularyLists";

/// The language words are translated into. The source language is always French.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Ord, PartialOrd, Hash, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    English,
    German,
}

impl TargetLanguage {
    pub fn label(self) -> &'static str {
        match self {
            TargetLanguage::English => "Anglais",
            TargetLanguage::German => "Allemand",
        }
    }

    /// Lowercase name, as used inside prompts ("Traduire en anglais :").
    pub fn name_in_prompt(self) -> &'static str {
        match self {
            TargetLanguage::English => "anglais",
            TargetLanguage::German => "allemand",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct WordPair {
    pub id: String,
    pub source_term: String,
    pub translation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyList {
    pub id: String,
    pub name: String,
    pub target_language: TargetLanguage,
    pub words: Vec<WordPair>,
    #[tsify(type = "string")]
    pub created_at: DateTime<Utc>,
    #[tsify(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// What the list editor hands over on save. Ids are absent for new lists and new words.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ListDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub target_language: TargetLanguage,
    pub words: Vec<WordDraft>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct WordDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub source_term: String,
    pub translation: String,
}

impl WordDraft {
    pub fn new(source_term: &str, translation: &str) -> Self {
        Self {
            id: None,
            source_term: source_term.to_string(),
            translation: translation.to_string(),
        }
    }
}

/// One row of the list picker.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: String,
    pub name: String,
    pub target_language: TargetLanguage,
    pub language_label: String,
    pub word_count: usize,
    pub needs_practice: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("the list needs a name")]
    MissingName,

    #[error("the list needs at least one complete word pair")]
    NoWords,

    #[error("no list with id {0}")]
    NotFound(String),
}

impl ListDraft {
    /// Trims everything, drops half-filled pairs and assigns missing word ids.
    fn into_words(self) -> Result<(String, TargetLanguage, Vec<WordPair>), ListError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ListError::MissingName);
        }

        let mut seen_ids = BTreeSet::new();
        let words: Vec<WordPair> = self
            .words
            .into_iter()
            .filter_map(|word| {
                let source_term = word.source_term.trim().to_string();
                let translation = word.translation.trim().to_string();
                if source_term.is_empty() || translation.is_empty() {
                    return None;
                }
                let id = word
                    .id
                    .filter(|id| !id.is_empty() && !seen_ids.contains(id))
                    .unwrap_or_else(eyedee::get_uuid);
                seen_ids.insert(id.clone());
                Some(WordPair {
                    id,
                    source_term,
                    translation,
                })
            })
            .collect();

        if words.is_empty() {
            return Err(ListError::NoWords);
        }

        Ok((name, self.target_language, words))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct StoredLists(Vec<VocabularyList>);

#[derive(Serialize, Deserialize)]
#[serde(tag = "version")]
enum VersionedLists {
    V1 { lists: Vec<VocabularyList> },
}

impl Record for StoredLists {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(VersionedLists::V1 {
            lists: self.0.clone(),
        })
    }

    fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<VersionedLists>(json.clone()).map(|versioned| match versioned {
            VersionedLists::V1 { lists } => StoredLists(lists),
        })
    }
}

/// All vocabulary lists, in creation order, written through to the shelf on every change.
pub struct ListStore {
    lists: Vec<VocabularyList>,
    shelf: Shelf,
}

impl ListStore {
    pub fn load(shelf: Shelf) -> Self {
        let StoredLists(lists) = shelf.load(LISTS_KEY);
        log::info!("Loaded {} vocabulary lists", lists.len());
        Self { lists, shelf }
    }

    pub fn all(&self) -> &[VocabularyList] {
        &self.lists
    }

    pub fn get(&self, id: &str) -> Option<&VocabularyList> {
        self.lists.iter().find(|list| list.id == id)
    }

    /// Creates a list (no id in the draft) or replaces an existing one wholesale.
    pub fn save(&mut self, draft: ListDraft, now: DateTime<Utc>) -> Result<&VocabularyList, ListError> {
        let existing = match &draft.id {
            Some(id) => Some(
                self.lists
                    .iter()
                    .position(|list| &list.id == id)
                    .ok_or_else(|| ListError::NotFound(id.clone()))?,
            ),
            None => None,
        };
        let id = draft.id.clone();
        let (name, target_language, words) = draft.into_words()?;

        let index = match existing {
            Some(index) => {
                let list = &mut self.lists[index];
                list.name = name;
                list.target_language = target_language;
                list.words = words;
                list.updated_at = now;
                index
            }
            None => {
                self.lists.push(VocabularyList {
                    id: id.unwrap_or_else(eyedee::get_uuid),
                    name,
                    target_language,
                    words,
                    created_at: now,
                    updated_at: now,
                });
                self.lists.len() - 1
            }
        };
        log::info!(
            "Saved list {} with {} words",
            self.lists[index].id,
            self.lists[index].words.len()
        );
        self.persist();
        Ok(&self.lists[index])
    }

    /// Removes the list. Returns it if it existed.
    pub fn delete(&mut self, id: &str) -> Option<VocabularyList> {
        let index = self.lists.iter().position(|list| list.id == id)?;
        let removed = self.lists.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn shelf_mut(&mut self) -> &mut Shelf {
        &mut self.shelf
    }

    fn persist(&mut self) {
        let record = StoredLists(self.lists.clone());
        if let Err(e) = self.shelf.save(LISTS_KEY, &record, None) {
            log::error!("Could not persist vocabulary lists: {e}");
        }
    }
}
