//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Card-reading submissions run through the `ReadingWizard` state machine
//! from `fal_core`: the client sends its selected cards in order and the
//! server replays them through the wizard, so the card-count and duplicate
//! rules are enforced here no matter what the client did.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, NaiveDate, Utc};
use fal_core::domain::{Card, ReadingKind, StoredCard};
use fal_core::wizard::{CardReading, ReadingWizard, SubmitOutcome, WizardError};
use fal_core::zodiac::ZodiacSign;
use fal_core::{catalog, NewDream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        tarot_catalog_handler,
        katina_catalog_handler,
        tarot_reading_handler,
        katina_reading_handler,
        list_tarot_readings_handler,
        get_tarot_reading_handler,
        list_katina_readings_handler,
        get_katina_reading_handler,
        dream_handler,
        list_dreams_handler,
        get_dream_handler,
    ),
    components(
        schemas(
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
            SelectedCardRequest,
            CardReadingRequest,
            CardReadingResponse,
            ReadingHistoryEntry,
            DreamRequest,
            DreamResponse,
            DreamHistoryEntry,
        )
    ),
    tags(
        (name = "Fal API", description = "API endpoints for tarot readings, Katina readings and dream interpretations.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// One card the client picked during step 1, in pick order.
#[derive(Deserialize, ToSchema)]
pub struct SelectedCardRequest {
    pub name: String,
    /// Orientation decided at pick time. Only honored for Katina readings.
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct CardReadingRequest {
    pub cards: Vec<SelectedCardRequest>,
    pub question: String,
    pub birth_date: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct CardReadingResponse {
    /// Turkish zodiac sign label resolved from the birth date.
    pub zodiac_sign: String,
    #[schema(value_type = Vec<Object>)]
    pub selected_cards: Vec<StoredCard>,
    #[schema(value_type = Object)]
    pub interpretation: serde_json::Value,
}

/// A stored reading as returned by the history endpoints.
#[derive(Serialize, ToSchema)]
pub struct ReadingHistoryEntry {
    pub id: Uuid,
    pub question: String,
    pub birth_date: NaiveDate,
    #[schema(value_type = Vec<Object>)]
    pub selected_cards: Vec<StoredCard>,
    #[schema(value_type = Object)]
    pub interpretation: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema)]
pub struct DreamRequest {
    pub description: String,
    #[serde(default)]
    pub emotions: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DreamResponse {
    #[schema(value_type = Object)]
    pub interpretation: serde_json::Value,
}

#[derive(Serialize, ToSchema)]
pub struct DreamHistoryEntry {
    pub id: Uuid,
    pub description: String,
    pub emotions: Vec<String>,
    #[schema(value_type = Object)]
    pub interpretation: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

fn wizard_error_response(e: WizardError) -> (StatusCode, String) {
    match e {
        WizardError::Generation(inner) => {
            error!("Failed to generate interpretation: {:?}", inner);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate interpretation".to_string(),
            )
        }
        other => (StatusCode::BAD_REQUEST, other.to_string()),
    }
}

fn port_error_response(context: &str, e: fal_core::PortError) -> (StatusCode, String) {
    match e {
        fal_core::PortError::NotFound(_) => {
            (StatusCode::NOT_FOUND, format!("{context} not found"))
        }
        other => {
            error!("{context} lookup failed: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

/// Replays the client's picks through the wizard and submits the reading.
async fn run_card_reading(
    state: &AppState,
    user_id: Uuid,
    kind: ReadingKind,
    req: CardReadingRequest,
) -> Result<CardReadingResponse, (StatusCode, String)> {
    let mut wizard = match kind {
        ReadingKind::Tarot => ReadingWizard::tarot(),
        ReadingKind::Katina => ReadingWizard::katina(),
        ReadingKind::Dream => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Dream interpretations carry no cards".to_string(),
            ))
        }
    };

    for card in &req.cards {
        // Tarot cards are always upright; the flag only applies to Katina.
        let reversed = card.reversed && kind == ReadingKind::Katina;
        wizard
            .select_prechosen(&card.name, reversed)
            .map_err(wizard_error_response)?;
    }
    wizard.proceed_to_details().map_err(wizard_error_response)?;
    wizard
        .set_details(&req.question, req.birth_date)
        .map_err(wizard_error_response)?;
    if kind == ReadingKind::Katina {
        let meanings = state.katina_meanings.clone();
        wizard
            .annotate_meanings(move |name| meanings.get(name))
            .map_err(wizard_error_response)?;
    }

    let outcome = wizard
        .submit(Some(user_id), state.interpreter.as_ref(), state.db.as_ref())
        .await
        .map_err(wizard_error_response)?;

    let reading = match outcome {
        SubmitOutcome::Completed(reading) => reading,
        // Unreachable behind the auth middleware.
        SubmitOutcome::AuthRequired => {
            return Err((StatusCode::UNAUTHORIZED, "Login required".to_string()))
        }
    };

    let interpretation = match &reading {
        CardReading::Tarot(r) => serde_json::to_value(r),
        CardReading::Katina(r) => serde_json::to_value(r),
    }
    .map_err(|e| {
        error!("Failed to serialize interpretation: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    })?;

    let katina = kind == ReadingKind::Katina;
    let selected_cards = wizard
        .spread()
        .drawn()
        .iter()
        .map(|dc| StoredCard {
            name: dc.card.name.clone(),
            suit: dc.card.suit.clone(),
            image: dc.card.image.clone(),
            reversed: katina.then_some(dc.reversed),
        })
        .collect();

    Ok(CardReadingResponse {
        zodiac_sign: ZodiacSign::from_date(req.birth_date).label().to_string(),
        selected_cards,
        interpretation,
    })
}

async fn list_readings(
    state: &AppState,
    kind: ReadingKind,
    user_id: Uuid,
) -> Result<Json<Vec<ReadingHistoryEntry>>, (StatusCode, String)> {
    let records = state
        .db
        .list_card_readings(kind, user_id)
        .await
        .map_err(|e| port_error_response("Reading", e))?;
    let entries = records
        .into_iter()
        .map(|r| ReadingHistoryEntry {
            id: r.id,
            question: r.question,
            birth_date: r.birth_date,
            selected_cards: r.selected_cards,
            interpretation: r.interpretation,
            created_at: r.created_at,
        })
        .collect();
    Ok(Json(entries))
}

async fn get_reading(
    state: &AppState,
    kind: ReadingKind,
    user_id: Uuid,
    reading_id: Uuid,
) -> Result<Json<ReadingHistoryEntry>, (StatusCode, String)> {
    let r = state
        .db
        .get_card_reading(kind, user_id, reading_id)
        .await
        .map_err(|e| port_error_response("Reading", e))?;
    Ok(Json(ReadingHistoryEntry {
        id: r.id,
        question: r.question,
        birth_date: r.birth_date,
        selected_cards: r.selected_cards,
        interpretation: r.interpretation,
        created_at: r.created_at,
    }))
}

//=========================================================================================
// Card Catalog Handlers (public)
//=========================================================================================

/// List the 78-card tarot deck.
#[utoipa::path(
    get,
    path = "/cards/tarot",
    responses((status = 200, description = "The full tarot deck", body = Vec<Object>))
)]
pub async fn tarot_catalog_handler() -> Json<Vec<Card>> {
    Json(catalog::tarot_catalog())
}

/// List the 65-card Katina deck.
#[utoipa::path(
    get,
    path = "/cards/katina",
    responses((status = 200, description = "The full Katina deck", body = Vec<Object>))
)]
pub async fn katina_catalog_handler() -> Json<Vec<Card>> {
    Json(catalog::katina_catalog())
}

//=========================================================================================
// Card Reading Handlers
//=========================================================================================

/// Submit a three-card tarot reading.
#[utoipa::path(
    post,
    path = "/readings/tarot",
    request_body = CardReadingRequest,
    responses(
        (status = 200, description = "Reading generated", body = CardReadingResponse),
        (status = 400, description = "Invalid selection or details"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Interpretation failed")
    )
)]
pub async fn tarot_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CardReadingRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let response = run_card_reading(&state, user_id, ReadingKind::Tarot, req).await?;
    Ok(Json(response))
}

/// Submit a ten-card Katina reading.
#[utoipa::path(
    post,
    path = "/readings/katina",
    request_body = CardReadingRequest,
    responses(
        (status = 200, description = "Reading generated", body = CardReadingResponse),
        (status = 400, description = "Invalid selection or details"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Interpretation failed")
    )
)]
pub async fn katina_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CardReadingRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let response = run_card_reading(&state, user_id, ReadingKind::Katina, req).await?;
    Ok(Json(response))
}

/// List the caller's tarot readings, newest first.
#[utoipa::path(
    get,
    path = "/readings/tarot",
    responses((status = 200, description = "Reading history", body = Vec<ReadingHistoryEntry>))
)]
pub async fn list_tarot_readings_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    list_readings(&state, ReadingKind::Tarot, user_id).await
}

/// Fetch one of the caller's tarot readings.
#[utoipa::path(
    get,
    path = "/readings/tarot/{reading_id}",
    params(("reading_id" = Uuid, Path, description = "The reading to fetch")),
    responses(
        (status = 200, description = "The stored reading", body = ReadingHistoryEntry),
        (status = 404, description = "No such reading for this user")
    )
)]
pub async fn get_tarot_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(reading_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    get_reading(&state, ReadingKind::Tarot, user_id, reading_id).await
}

/// List the caller's Katina readings, newest first.
#[utoipa::path(
    get,
    path = "/readings/katina",
    responses((status = 200, description = "Reading history", body = Vec<ReadingHistoryEntry>))
)]
pub async fn list_katina_readings_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    list_readings(&state, ReadingKind::Katina, user_id).await
}

/// Fetch one of the caller's Katina readings.
#[utoipa::path(
    get,
    path = "/readings/katina/{reading_id}",
    params(("reading_id" = Uuid, Path, description = "The reading to fetch")),
    responses(
        (status = 200, description = "The stored reading", body = ReadingHistoryEntry),
        (status = 404, description = "No such reading for this user")
    )
)]
pub async fn get_katina_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(reading_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    get_reading(&state, ReadingKind::Katina, user_id, reading_id).await
}

//=========================================================================================
// Dream Interpretation Handlers
//=========================================================================================

/// Submit a dream for interpretation.
#[utoipa::path(
    post,
    path = "/dreams",
    request_body = DreamRequest,
    responses(
        (status = 200, description = "Dream interpreted", body = DreamResponse),
        (status = 400, description = "Description too short"),
        (status = 500, description = "Interpretation failed")
    )
)]
pub async fn dream_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<DreamRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let description = req.description.trim();
    if description.chars().count() < 10 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Dream description must be at least 10 characters".to_string(),
        ));
    }

    let reading = state
        .interpreter
        .interpret_dream(description, &req.emotions)
        .await
        .map_err(|e| {
            error!("Failed to interpret dream: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate interpretation".to_string(),
            )
        })?;

    let interpretation = serde_json::to_value(&reading).map_err(|e| {
        error!("Failed to serialize interpretation: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    })?;

    let new_dream = NewDream {
        user_id,
        description: description.to_string(),
        emotions: req.emotions,
        interpretation: interpretation.clone(),
    };
    if let Err(e) = state.db.save_dream(&new_dream).await {
        // The caller still gets their interpretation; only history is affected.
        warn!(error = %e, "failed to persist dream interpretation, continuing");
    }

    Ok(Json(DreamResponse { interpretation }))
}

/// List the caller's dream interpretations, newest first.
#[utoipa::path(
    get,
    path = "/dreams",
    responses((status = 200, description = "Dream history", body = Vec<DreamHistoryEntry>))
)]
pub async fn list_dreams_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = state
        .db
        .list_dreams(user_id)
        .await
        .map_err(|e| port_error_response("Dream interpretation", e))?;
    let entries: Vec<DreamHistoryEntry> = records
        .into_iter()
        .map(|r| DreamHistoryEntry {
            id: r.id,
            description: r.description,
            emotions: r.emotions,
            interpretation: r.interpretation,
            created_at: r.created_at,
        })
        .collect();
    Ok(Json(entries))
}

/// Fetch one of the caller's dream interpretations.
#[utoipa::path(
    get,
    path = "/dreams/{dream_id}",
    params(("dream_id" = Uuid, Path, description = "The dream interpretation to fetch")),
    responses(
        (status = 200, description = "The stored interpretation", body = DreamHistoryEntry),
        (status = 404, description = "No such dream interpretation for this user")
    )
)]
pub async fn get_dream_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(dream_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let r = state
        .db
        .get_dream(user_id, dream_id)
        .await
        .map_err(|e| port_error_response("Dream interpretation", e))?;
    Ok(Json(DreamHistoryEntry {
        id: r.id,
        description: r.description,
        emotions: r.emotions,
        interpretation: r.interpretation,
        created_at: r.created_at,
    }))
}
