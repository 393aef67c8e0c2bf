// ── Session configuration ──
//
// Tunables for a `Session`. Transport settings live with the gateway
// implementation; this only covers client-side state behavior.

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How many history items the dashboard strip shows.
    pub recent_history_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recent_history_len: 3,
        }
    }
}
