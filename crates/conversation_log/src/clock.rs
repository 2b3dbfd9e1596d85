use std::fmt;

use time::{OffsetDateTime, UtcOffset};

/// Source of turn timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock rendered in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    #[must_use]
    pub fn utc() -> Self {
        Self::with_offset(UtcOffset::UTC)
    }

    #[must_use]
    pub fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Uses the host's local offset, falling back to UTC when it cannot be
    /// determined soundly (for example once other threads are running).
    #[must_use]
    pub fn local() -> Self {
        Self::with_offset(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
    }

    #[must_use]
    pub fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::local()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_reports_configured_offset() {
        let offset = UtcOffset::from_hms(2, 0, 0).expect("valid offset");
        let clock = SystemClock::with_offset(offset);

        assert_eq!(clock.now().offset(), offset);
        assert_eq!(SystemClock::utc().now().offset(), UtcOffset::UTC);
    }
}
