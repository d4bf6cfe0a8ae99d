//! Localized text table.
//!
//! Maps a [`TextId`] to per-language strings. Lookups for an unknown
//! language fall back to English, then to any available translation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::TextId;

pub const ENGLISH: &str = "en";

/// UUID-keyed, language-tagged string table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Texts {
    pub entries: BTreeMap<TextId, BTreeMap<String, String>>,
}

impl Texts {
    /// Look up `id` in `lang`, falling back to English and then to any
    /// translation present. Returns `None` only for unknown ids or empty
    /// entries.
    pub fn get(&self, id: TextId, lang: &str) -> Option<&str> {
        let by_lang = self.entries.get(&id)?;
        by_lang
            .get(lang)
            .or_else(|| by_lang.get(ENGLISH))
            .or_else(|| by_lang.values().next())
            .map(String::as_str)
    }

    /// All language tags appearing anywhere in the table, English first,
    /// then lexicographic.
    pub fn languages(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .entries
            .values()
            .flat_map(|by_lang| by_lang.keys().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        if let Some(pos) = tags.iter().position(|t| t == ENGLISH)
            && pos != 0
        {
            let english = tags.remove(pos);
            tags.insert(0, english);
        }
        tags
    }

    pub fn insert(&mut self, id: TextId, lang: &str, text: &str) {
        self.entries
            .entry(id)
            .or_default()
            .insert(lang.to_string(), text.to_string());
    }
}
