//! Configuration module for Report-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and expanding query tier templates into search queries.
//!
//! # Example
//!
//! ```no_run
//! use report_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! for tier in &config.tiers {
//!     println!("{}", tier.render("Acme Corp", config.search.report_year));
//! }
//! ```

mod parser;
mod tiers;
mod types;
mod validation;

// Re-export types
pub use types::{Config, EngineConfig, OutputConfig, QueryTier, SearchConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use tiers::{company_slug, default_tiers};
pub use validation::validate;
