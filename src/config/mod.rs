//! Configuration for pricing batches
//!
//! `PriceScrapeConfig` is the single configuration object handed to the
//! orchestrator. It is built once, validated, and read-only afterwards.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::{CREDENTIAL_VARS, PriceScrapeConfigBuilder};
pub use types::PriceScrapeConfig;
