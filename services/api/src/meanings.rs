//! services/api/src/meanings.rs
//!
//! Loader for the Katina card meaning texts. The data file ships with the
//! service and keeps the Turkish field names of the original asset, keyed by
//! card name; cards without an entry degrade to "Bilinmiyor" in the prompt.

use crate::error::ApiError;
use fal_core::domain::CardMeaning;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct MeaningEntry {
    #[serde(rename = "Kartın Adı")]
    name: String,
    #[serde(rename = "Açıklaması")]
    description: String,
    #[serde(rename = "Düz Açılım Anlamı")]
    upright: String,
    #[serde(rename = "Ters Açılım Anlamı")]
    reversed: String,
}

/// Card-name → meaning lookup, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct KatinaMeanings {
    by_name: HashMap<String, CardMeaning>,
}

impl KatinaMeanings {
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<MeaningEntry> = serde_json::from_str(&raw)?;
        let by_name = entries
            .into_iter()
            .map(|e| {
                (
                    e.name,
                    CardMeaning {
                        description: e.description,
                        upright: e.upright,
                        reversed: e.reversed,
                    },
                )
            })
            .collect();
        Ok(Self { by_name })
    }

    pub fn get(&self, card_name: &str) -> Option<CardMeaning> {
        self.by_name.get(card_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_the_bundled_data_file() {
        let meanings =
            KatinaMeanings::load(Path::new("./data/katina_meanings.json")).unwrap();
        assert_eq!(meanings.len(), 65);
        let gunes = meanings.get("Gunes").unwrap();
        assert!(!gunes.description.is_empty());
        assert!(!gunes.upright.is_empty());
        assert!(!gunes.reversed.is_empty());
        assert!(meanings.get("yok-boyle-kart").is_none());
    }

    #[test]
    fn covers_every_catalog_card() {
        let meanings =
            KatinaMeanings::load(Path::new("./data/katina_meanings.json")).unwrap();
        for card in fal_core::catalog::katina_catalog() {
            assert!(
                meanings.get(&card.name).is_some(),
                "missing meaning for {}",
                card.name
            );
        }
    }
}
