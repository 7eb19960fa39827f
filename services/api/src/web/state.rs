//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::meanings::KatinaMeanings;
use fal_core::ports::{InterpretationService, ReadingStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn ReadingStore>,
    pub interpreter: Arc<dyn InterpretationService>,
    pub config: Arc<Config>,
    pub katina_meanings: Arc<KatinaMeanings>,
}
