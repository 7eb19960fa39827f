//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ReadingStore` port from the `fal_core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Tarot and Katina readings share one row shape and live in two tables that
//! differ only by name; `reading_table` picks the right one per kind.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fal_core::domain::{
    CardReadingRecord, DreamRecord, NewCardReading, NewDream, ReadingKind, StoredCard, User,
    UserCredentials,
};
use fal_core::ports::{PortError, PortResult, ReadingStore};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ReadingStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// The table holding card readings of the given kind.
fn reading_table(kind: ReadingKind) -> PortResult<&'static str> {
    match kind {
        ReadingKind::Tarot => Ok("tarot_card_readings"),
        ReadingKind::Katina => Ok("katina_card_readings"),
        ReadingKind::Dream => Err(PortError::Unexpected(
            "dream interpretations are not card readings".to_string(),
        )),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: Some(self.email),
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct CardReadingRow {
    id: Uuid,
    user_id: Uuid,
    question: String,
    birth_date: NaiveDate,
    selected_cards: serde_json::Value,
    interpretation: serde_json::Value,
    created_at: DateTime<Utc>,
}
impl CardReadingRow {
    fn to_domain(self) -> PortResult<CardReadingRecord> {
        let selected_cards: Vec<StoredCard> = serde_json::from_value(self.selected_cards)
            .map_err(|e| PortError::Unexpected(format!("corrupt selected_cards column: {e}")))?;
        Ok(CardReadingRecord {
            id: self.id,
            user_id: self.user_id,
            question: self.question,
            birth_date: self.birth_date,
            selected_cards,
            interpretation: self.interpretation,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct DreamRow {
    id: Uuid,
    user_id: Uuid,
    dream_description: String,
    metadata: serde_json::Value,
    interpretation: serde_json::Value,
    created_at: DateTime<Utc>,
}
impl DreamRow {
    fn to_domain(self) -> DreamRecord {
        let emotions = self
            .metadata
            .get("emotions")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        DreamRecord {
            id: self.id,
            user_id: self.user_id,
            description: self.dream_description,
            emotions,
            interpretation: self.interpretation,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `ReadingStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReadingStore for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User with email {} not found", email))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        row.map(|(user_id,)| user_id).ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn save_card_reading(
        &self,
        kind: ReadingKind,
        reading: &NewCardReading,
    ) -> PortResult<Uuid> {
        let table = reading_table(kind)?;
        let selected_cards = serde_json::to_value(&reading.selected_cards)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let sql = format!(
            "INSERT INTO {table} (id, user_id, question, birth_date, selected_cards, interpretation) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"
        );
        let (id,): (Uuid,) = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(reading.user_id)
            .bind(&reading.question)
            .bind(reading.birth_date)
            .bind(selected_cards)
            .bind(&reading.interpretation)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(id)
    }

    async fn list_card_readings(
        &self,
        kind: ReadingKind,
        user_id: Uuid,
    ) -> PortResult<Vec<CardReadingRecord>> {
        let table = reading_table(kind)?;
        let sql = format!(
            "SELECT id, user_id, question, birth_date, selected_cards, interpretation, created_at \
             FROM {table} WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, CardReadingRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        rows.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_card_reading(
        &self,
        kind: ReadingKind,
        user_id: Uuid,
        reading_id: Uuid,
    ) -> PortResult<CardReadingRecord> {
        let table = reading_table(kind)?;
        let sql = format!(
            "SELECT id, user_id, question, birth_date, selected_cards, interpretation, created_at \
             FROM {table} WHERE id = $1 AND user_id = $2"
        );
        let row = sqlx::query_as::<_, CardReadingRow>(&sql)
            .bind(reading_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Reading {} not found", reading_id))
                }
                _ => PortError::Unexpected(e.to_string()),
            })?;
        row.to_domain()
    }

    async fn save_dream(&self, dream: &NewDream) -> PortResult<Uuid> {
        let metadata = serde_json::json!({ "emotions": dream.emotions });
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO dream_interpretations \
             (id, user_id, dream_description, metadata, interpretation, status) \
             VALUES ($1, $2, $3, $4, $5, 'completed') RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(dream.user_id)
        .bind(&dream.description)
        .bind(metadata)
        .bind(&dream.interpretation)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(id)
    }

    async fn list_dreams(&self, user_id: Uuid) -> PortResult<Vec<DreamRecord>> {
        let rows = sqlx::query_as::<_, DreamRow>(
            "SELECT id, user_id, dream_description, metadata, interpretation, created_at \
             FROM dream_interpretations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_dream(&self, user_id: Uuid, dream_id: Uuid) -> PortResult<DreamRecord> {
        let row = sqlx::query_as::<_, DreamRow>(
            "SELECT id, user_id, dream_description, metadata, interpretation, created_at \
             FROM dream_interpretations WHERE id = $1 AND user_id = $2",
        )
        .bind(dream_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Dream interpretation {} not found", dream_id))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(row.to_domain())
    }
}
