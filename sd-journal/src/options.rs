use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Per-journal settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalOptions {
    /// Offset from UTC used to present entry timestamps as local time.
    pub utc_offset_seconds: i32,
}

impl JournalOptions {
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset_seconds = offset.local_minus_utc();
        self
    }

    /// The configured offset; out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
    }
}
