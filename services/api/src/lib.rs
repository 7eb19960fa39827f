pub mod adapters;
pub mod config;
pub mod error;
pub mod meanings;
pub mod web;
