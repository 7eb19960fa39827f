//! crates/fal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization target
//! beyond the JSON shapes the generation service is asked to produce.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three reading types the platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    Tarot,
    Katina,
    Dream,
}

impl ReadingKind {
    /// Fixed number of cards a complete reading of this kind holds.
    /// Dream readings draw no cards.
    pub fn card_capacity(self) -> usize {
        match self {
            ReadingKind::Tarot => 3,
            ReadingKind::Katina => 10,
            ReadingKind::Dream => 0,
        }
    }
}

/// A single catalog card. Catalogs are process-lifetime constants; a `Card`
/// is never mutated after the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub suit: Option<String>,
    pub image: String,
}

/// Precomputed meaning texts for a Katina card, keyed by orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMeaning {
    pub description: String,
    pub upright: String,
    pub reversed: String,
}

/// A catalog card currently assigned to a position within the active reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnCard {
    pub card: Card,
    /// Fixed semantic slot within the spread, e.g. "Geçmiş".
    pub position: &'static str,
    /// Orientation flag. Only Katina draws can come up reversed.
    pub reversed: bool,
    /// Meaning texts attached before prompt assembly (Katina only).
    pub meaning: Option<CardMeaning>,
}

impl DrawnCard {
    /// The meaning text matching this card's orientation, if one is attached.
    pub fn oriented_meaning(&self) -> Option<&str> {
        self.meaning.as_ref().map(|m| {
            if self.reversed {
                m.reversed.as_str()
            } else {
                m.upright.as_str()
            }
        })
    }
}

//=========================================================================================
// Interpretation result shapes (one per reading type)
//=========================================================================================

/// One per-card entry inside a tarot or Katina interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInterpretation {
    pub position: String,
    pub name: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TarotReading {
    pub summary: String,
    pub cards: Vec<CardInterpretation>,
    pub relationship: String,
    pub future: String,
    pub advice: String,
    #[serde(rename = "zodiacInfluence")]
    pub zodiac_influence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KatinaReading {
    pub summary: String,
    pub cards: Vec<CardInterpretation>,
    pub future: String,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamSymbol {
    pub name: String,
    pub meaning: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamEmotion {
    pub name: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamReading {
    pub summary: String,
    pub interpretation: String,
    pub symbols: Vec<DreamSymbol>,
    pub emotions: Vec<DreamEmotion>,
    pub guidance: String,
}

//=========================================================================================
// Users and auth sessions
//=========================================================================================

// Represents a user - used throughout the app.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Persisted reading shapes
//=========================================================================================

/// The persisted form of one drawn card, as stored in the `selected_cards`
/// JSON column. `suit` is present for tarot, `reversed` for Katina.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCard {
    pub name: String,
    #[serde(default)]
    pub suit: Option<String>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversed: Option<bool>,
}

/// A card reading about to be written to the store.
#[derive(Debug, Clone)]
pub struct NewCardReading {
    pub user_id: Uuid,
    pub question: String,
    pub birth_date: NaiveDate,
    pub selected_cards: Vec<StoredCard>,
    pub interpretation: serde_json::Value,
}

/// A card reading as read back from the store. Read-only after creation.
#[derive(Debug, Clone)]
pub struct CardReadingRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub birth_date: NaiveDate,
    pub selected_cards: Vec<StoredCard>,
    pub interpretation: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A dream interpretation about to be written to the store.
#[derive(Debug, Clone)]
pub struct NewDream {
    pub user_id: Uuid,
    pub description: String,
    pub emotions: Vec<String>,
    pub interpretation: serde_json::Value,
}

/// A dream interpretation as read back from the store.
#[derive(Debug, Clone)]
pub struct DreamRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub emotions: Vec<String>,
    pub interpretation: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
