use tracing::warn;

pub const MAX_PLAYERS: usize = 2;
pub const TURN_DURATION_MS: u64 = 30_000;
pub const SCORE_PER_ROW: u64 = 100;
pub const ROOM_IDLE_TIMEOUT_MS: u64 = 5 * 60 * 1000;
pub const TICK_INTERVAL_MS: u64 = 1_000;
pub const EVICTION_INTERVAL_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
    pub turn_duration_ms: u64,
    pub score_per_row: u64,
    pub idle_timeout_ms: u64,
    pub tick_interval_ms: u64,
    pub eviction_interval_ms: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            turn_duration_ms: TURN_DURATION_MS,
            score_per_row: SCORE_PER_ROW,
            idle_timeout_ms: ROOM_IDLE_TIMEOUT_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
            eviction_interval_ms: EVICTION_INTERVAL_MS,
        }
    }
}

impl RoomConfig {
    /// Defaults, with `TURN_DURATION_MS` and `ROOM_IDLE_TIMEOUT_MS` taken from
    /// the environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env_ms("TURN_DURATION_MS") {
            config = config.with_turn_duration_ms(ms);
        }
        if let Some(ms) = env_ms("ROOM_IDLE_TIMEOUT_MS") {
            config = config.with_idle_timeout_ms(ms);
        }
        config
    }

    pub fn with_turn_duration_ms(mut self, ms: u64) -> Self {
        self.turn_duration_ms = ms;
        self
    }

    pub fn with_idle_timeout_ms(mut self, ms: u64) -> Self {
        self.idle_timeout_ms = ms;
        self
    }

    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms.max(1);
        self
    }

    pub fn with_eviction_interval_ms(mut self, ms: u64) -> Self {
        self.eviction_interval_ms = ms.max(1);
        self
    }
}

fn env_ms(key: &str) -> Option<u64> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(ms) if ms > 0 => Some(ms),
        _ => {
            warn!("Ignoring {}={}: expected a positive number of milliseconds", key, value);
            None
        }
    }
}
