#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-behavior tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BehaviorConfig {
    /// Upper bound on follow-on results resolved in one go (a start that changes, whose
    /// replacement changes again, ...). Exceeding it is a fatal configuration loop.
    pub max_resolve_depth: usize,
    /// Log every stack transition through `tracing` at debug level.
    pub log_state: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_resolve_depth: 64,
            log_state: false,
        }
    }
}
