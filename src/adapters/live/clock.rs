//! Live clock backed by the system clock.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Wall clock used by the scheduler between passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
