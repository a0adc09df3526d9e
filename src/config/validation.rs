//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and endpoint
//! formats. All errors are collected, not just the first.

use std::fmt;
use std::net::SocketAddr;

use reqwest::header::HeaderName;
use url::Url;

use crate::config::schema::AppConfig;

/// Protocol limit on the validity window of a transaction.
pub const MAX_VALIDITY_ROUNDS: u64 = 1000;

/// Protocol limit on the note field.
pub const MAX_NOTE_BYTES: usize = 1024;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_endpoint(&mut errors, "node.algod_url", &config.node.algod_url);
    check_endpoint(&mut errors, "node.indexer_url", &config.node.indexer_url);
    for url in &config.node.failover_urls {
        check_endpoint(&mut errors, "node.failover_urls", url);
    }

    if HeaderName::from_bytes(config.node.api_key_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "node.api_key_header",
            format!("'{}' is not a valid header name", config.node.api_key_header),
        ));
    }

    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "node.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    let tx = &config.transactions;
    if tx.confirmation_rounds == 0 {
        errors.push(ValidationError::new(
            "transactions.confirmation_rounds",
            "must be greater than zero",
        ));
    }
    if tx.validity_rounds == 0 || tx.validity_rounds > MAX_VALIDITY_ROUNDS {
        errors.push(ValidationError::new(
            "transactions.validity_rounds",
            format!("must be between 1 and {}", MAX_VALIDITY_ROUNDS),
        ));
    }
    if tx.max_note_bytes > MAX_NOTE_BYTES {
        errors.push(ValidationError::new(
            "transactions.max_note_bytes",
            format!("must not exceed {}", MAX_NOTE_BYTES),
        ));
    }

    let obs = &config.observability;
    if !matches!(obs.log_format.to_lowercase().as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", obs.log_format),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            field,
            format!("invalid URL '{}': {}", value, e),
        )),
    }
}
