//! Time-bounded iteration.

use crate::Journal;
use crate::error::JournalError;
use journal_common::{Microseconds, Period};
use sd_journal_sys::NativeOps;
use tracing::debug;

impl<O: NativeOps> Journal<O> {
    /// Calls `callback` on each entry with a timestamp in `[start, end)`,
    /// visiting at most `limit` entries, and returns how many were visited.
    ///
    /// With a `start`, the scan first moves forward to the first entry at or
    /// after it, failing with [`JournalError::TimeNotFound`] if there is none.
    /// Without one, it starts at the current entry, or the next one if the
    /// position is on no entry. A missing `end` means the timestamp of the
    /// latest entry in the journal.
    ///
    /// The callback runs with the journal on the entry and may read from it.
    /// It is also invoked for the first entry at or past `end`, which ends
    /// the scan without being counted. Any error it returns aborts the scan
    /// and is passed through unchanged.
    pub fn for_each_in_range<F, E>(
        &mut self,
        start: Option<Microseconds>,
        end: Option<Microseconds>,
        limit: usize,
        mut callback: F,
    ) -> Result<usize, E>
    where
        F: FnMut(&mut Self) -> Result<(), E>,
        E: From<JournalError>,
    {
        if limit == 0 {
            return Ok(0);
        }
        if let (Some(start), Some(end)) = (start, end) {
            if Period::new(start, end).is_inverted() {
                return Ok(0);
            }
        }

        match start {
            Some(start) => {
                if !self.move_forward_until_time(start)? {
                    return Err(JournalError::TimeNotFound.into());
                }
            }
            None => {
                if !self.ensure_entry(true)? {
                    return Ok(0);
                }
            }
        }

        let end = match end {
            Some(end) => end,
            None => self.cutoff()?.until,
        };

        let mut processed = 0;
        loop {
            callback(self)?;
            if self.timestamp_usec()? >= end {
                break;
            }
            processed += 1;
            if processed >= limit || !self.move_to_next()? {
                break;
            }
        }

        debug!(?start, %end, processed, "finished range scan");
        Ok(processed)
    }
}
