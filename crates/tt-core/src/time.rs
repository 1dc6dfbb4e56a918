use core::fmt;

use serde::{Deserialize, Serialize};

/// Event timestamp as whole seconds plus sub-second ticks.
///
/// Ordering is lexicographic on `(seconds, nanoseconds)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ClockTime {
    pub seconds: u32,
    pub nanoseconds: u32,
}

impl ClockTime {
    pub const fn new(seconds: u32, nanoseconds: u32) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanoseconds)
    }
}
