//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Inclusive on both ends.
    fn gen_range(&self, min: i32, max: i32) -> i32;
    /// Opaque bearer token.
    fn gen_token(&self) -> String;
}
