//! crates/fal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{
    CardReadingRecord, DrawnCard, DreamReading, DreamRecord, KatinaReading, NewCardReading,
    NewDream, ReadingKind, TarotReading, User, UserCredentials,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence boundary: users, auth sessions, and stored readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Card Readings (tarot and Katina share one shape) ---
    async fn save_card_reading(
        &self,
        kind: ReadingKind,
        reading: &NewCardReading,
    ) -> PortResult<Uuid>;

    /// Lists a user's readings of one kind, newest first.
    async fn list_card_readings(
        &self,
        kind: ReadingKind,
        user_id: Uuid,
    ) -> PortResult<Vec<CardReadingRecord>>;

    async fn get_card_reading(
        &self,
        kind: ReadingKind,
        user_id: Uuid,
        reading_id: Uuid,
    ) -> PortResult<CardReadingRecord>;

    // --- Dream Interpretations ---
    async fn save_dream(&self, dream: &NewDream) -> PortResult<Uuid>;

    async fn list_dreams(&self, user_id: Uuid) -> PortResult<Vec<DreamRecord>>;

    async fn get_dream(&self, user_id: Uuid, dream_id: Uuid) -> PortResult<DreamRecord>;
}

/// Generation boundary. Implementations assemble the prompt, call the
/// external model, and repair its output; a `PortError` here means the
/// generation call itself failed, never that the output was malformed.
#[async_trait]
pub trait InterpretationService: Send + Sync {
    async fn interpret_tarot(
        &self,
        cards: &[DrawnCard],
        birth_date: NaiveDate,
        question: &str,
    ) -> PortResult<TarotReading>;

    async fn interpret_katina(
        &self,
        cards: &[DrawnCard],
        birth_date: NaiveDate,
        question: &str,
    ) -> PortResult<KatinaReading>;

    async fn interpret_dream(
        &self,
        description: &str,
        emotions: &[String],
    ) -> PortResult<DreamReading>;
}
