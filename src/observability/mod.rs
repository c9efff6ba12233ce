//! Observability for the gateway
//!
//! - Structured JSON logging with a process-wide minimum severity
//! - Executor counters
//! - Begin/complete scopes and timers
//!
//! ```ignore
//! use classsel_gateway::observability::Logger;
//!
//! Logger::info("GATEWAY_START", &[("addr", "0.0.0.0:5000")]);
//! ```

mod logger;
mod metrics;
mod scope;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};
