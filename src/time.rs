use chrono::{DateTime, Utc};

/// A source for the current time, so session issuance can be pinned in tests.
#[cfg_attr(test, mockall::automock)]
pub trait TimeService: Send + Sync + 'static {
    /// Returns the current UTC timestamp.
    fn current_time(&self) -> DateTime<Utc>;
}

/// A time service backed by the system clock.
pub struct DefaultTimeService;

impl TimeService for DefaultTimeService {
    fn current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
