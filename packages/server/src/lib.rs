//! BrandBuddy event-scrape service.
//!
//! Exposes the scrape pipeline (see the `scrape` crate) over HTTP:
//! `POST /event-scrape` takes an event page URL and returns a
//! structured event record, degrading gracefully when no model
//! credential is configured.

pub mod config;
pub mod server;

pub use config::{AppConfig, Config};
pub use server::{build_app, AppState};
