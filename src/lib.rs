//! Tagcrawl: an incremental tag-feed collector
//!
//! This crate implements a crawler that walks the paginated feed of a tag on
//! a remote source, normalizes each item into a [`Record`], merges the batch
//! into a persisted dataset with last-write-wins deduplication, and repeats
//! the cycle on a fixed interval for continuous ingestion.

pub mod config;
pub mod crawler;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for tagcrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Record error: {0}")]
    Record(#[from] record::RecordError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid base URL in config: {0}")]
    InvalidBaseUrl(String),
}

/// Result type alias for tagcrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CycleReport, CycleScheduler, HttpPageFetcher, PageFetcher, TerminationReason};
pub use record::Record;
pub use storage::Dataset;
