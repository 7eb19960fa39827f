pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the handlers the binary needs to build the router.
pub use middleware::require_auth;
pub use rest::{
    dream_handler, get_dream_handler, get_katina_reading_handler, get_tarot_reading_handler,
    katina_catalog_handler, katina_reading_handler, list_dreams_handler,
    list_katina_readings_handler, list_tarot_readings_handler, tarot_catalog_handler,
    tarot_reading_handler,
};
