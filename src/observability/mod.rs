//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Payment pipeline and node clients produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms via the metrics facade)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Transaction ids and rounds are structured fields, not message text
//! - Passphrases and keys are never logged
//! - Metrics are recorded even when no exporter is installed (no-op recorder)

pub mod logging;
pub mod metrics;
