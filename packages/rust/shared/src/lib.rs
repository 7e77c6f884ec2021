//! Shared types, error model, and configuration for Gateway Report.
//!
//! This crate is the foundation depended on by all other Gateway Report crates.
//! It provides:
//! - [`GatewayReportError`]: the unified error type
//! - Domain types ([`TimeWindow`], [`EventRecord`], [`CategoryLabel`], [`RunId`])
//! - Configuration ([`AppConfig`], [`ReportConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, DEFAULT_API_BASE_URL, EmailConfig, ReportConfig, SmtpConfig,
    SmtpSettings, SmtpTls, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{GatewayReportError, Result};
pub use types::{
    CategoryLabel, EventDimension, EventRecord, LOOKBACK_HOURS, RunId, TimeWindow,
    UNKNOWN_CATEGORY_DESCRIPTION, UNKNOWN_CATEGORY_NAME,
};
