//! Closed time windows between two journal timestamps.

use crate::Microseconds;
use serde::{Deserialize, Serialize};

/// An actual period: from one instant until another.
///
/// Both ends are kept at microsecond resolution. Construction does not
/// enforce `from <= until`; consumers that care must check
/// [`is_inverted()`](Period::is_inverted) themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub from: Microseconds,
    pub until: Microseconds,
}

impl Period {
    pub fn new(from: impl Into<Microseconds>, until: impl Into<Microseconds>) -> Self {
        Self {
            from: from.into(),
            until: until.into(),
        }
    }

    /// True when the window ends before it starts.
    pub fn is_inverted(&self) -> bool {
        self.until < self.from
    }
}
