//! HTTP route handlers.

mod health;
mod scrape;

pub use health::health_handler;
pub use scrape::{scrape_handler, ErrorResponse, ScrapeRequest, ScrapeResponse};
