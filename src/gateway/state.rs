//! Shared handler state

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::db::QueryExecutor;

/// Source of "now" for endpoints that compute the current timestamp
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// State shared across all handlers
#[derive(Clone)]
pub struct GatewayState {
    pub executor: QueryExecutor,
    clock: Clock,
}

impl GatewayState {
    /// State using the local wall clock
    pub fn new(executor: QueryExecutor) -> Self {
        Self::with_clock(executor, Arc::new(|| Local::now().naive_local()))
    }

    /// State with an explicit clock
    pub fn with_clock(executor: QueryExecutor, clock: Clock) -> Self {
        Self { executor, clock }
    }

    /// Current time truncated to whole seconds
    pub fn now(&self) -> NaiveDateTime {
        let now = (self.clock)();
        now.with_nanosecond(0).unwrap_or(now)
    }
}
