//! Configuration module for tagcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. All settings have defaults, so running without a config file is
//! supported.

mod parser;
mod types;

// Re-export types
pub use types::{Config, FetchConfig, OutputConfig, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, validate};
