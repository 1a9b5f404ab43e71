//! Data types for the scrape pipeline.

pub mod event;
pub mod platform;
