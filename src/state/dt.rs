use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock timestamp in milliseconds since the unix epoch. This is the
/// value clients see for turn deadlines, so it is absolute rather than
/// monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(u64);

impl Default for Instant {
    fn default() -> Self {
        Self::now()
    }
}

impl Instant {
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis();
        Self(ms as u64)
    }

    pub fn add_ms(&mut self, ms: u64) {
        self.0 = self.0.saturating_add(ms);
    }

    pub fn plus_ms(mut self, ms: u64) -> Self {
        self.add_ms(ms);
        self
    }

    pub fn ms_since(&self, earlier: Instant) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Instant {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

impl From<Instant> for u64 {
    fn from(instant: Instant) -> Self {
        instant.0
    }
}
