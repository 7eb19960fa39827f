//! services/api/src/adapters/mod.rs
//!
//! This module declares the concrete adapter implementations for the service
//! ports defined in the `fal_core` crate.

pub mod db;
pub mod llm;
