pub mod batting;
pub mod bowling;
pub mod cache;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod metrics;
pub mod scorecard_scraper;
pub mod summary;
pub mod tables;
pub mod teams;
pub mod types;
pub mod utils;
pub mod web;

pub use error::ExtractionError;
pub use scorecard_scraper::{extract, ScorecardScraper};
pub use types::Report;
