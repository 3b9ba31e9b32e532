//! Cursor movement.
//!
//! The read position lives in the native session. It is either on an entry
//! or on no entry at all: right after opening, and after seeking to the head
//! or the tail. Seeking never selects an entry by itself; a following
//! [`move_to_next()`](Journal::move_to_next) or
//! [`move_to_previous()`](Journal::move_to_previous) does.

use crate::Journal;
use crate::cursor::Cursor;
use crate::error::{JournalError, NativeCall, Result};
use crate::ret;
use chrono::{DateTime, FixedOffset, Utc};
use journal_common::{Microseconds, Period};
use sd_journal_sys::NativeOps;
use tracing::trace;

impl<O: NativeOps> Journal<O> {
    /// Seeks before the first entry.
    pub fn move_to_earliest(&mut self) -> Result<()> {
        let (ops, raw) = self.handle.parts()?;
        ret::status(NativeCall::SeekHead, ops.seek_head(raw))
    }

    /// Seeks past the last entry.
    pub fn move_to_latest(&mut self) -> Result<()> {
        let (ops, raw) = self.handle.parts()?;
        ret::status(NativeCall::SeekTail, ops.seek_tail(raw))
    }

    /// Moves to the next entry matching the active filters.
    ///
    /// Returns `false` at the end of the journal.
    pub fn move_to_next(&mut self) -> Result<bool> {
        let (ops, raw) = self.handle.parts()?;
        ret::step(NativeCall::Next, ops.next(raw))
    }

    /// Moves to the previous entry matching the active filters.
    ///
    /// Returns `false` at the start of the journal.
    pub fn move_to_previous(&mut self) -> Result<bool> {
        let (ops, raw) = self.handle.parts()?;
        ret::step(NativeCall::Previous, ops.previous(raw))
    }

    /// Moves `n` entries forward (or backward when negative).
    ///
    /// Returns the shortfall: how many of the requested entries could not be
    /// skipped because a boundary was reached. Zero means the full distance
    /// was covered.
    pub fn skip(&mut self, n: i64) -> Result<u64> {
        if n == 0 {
            return Ok(0);
        }

        let requested = n.unsigned_abs();
        let (ops, raw) = self.handle.parts()?;
        let (call, r) = if n > 0 {
            (NativeCall::NextSkip, ops.next_skip(raw, requested))
        } else {
            (NativeCall::PreviousSkip, ops.previous_skip(raw, requested))
        };

        let moved = ret::count(call, r)?;
        if moved > requested {
            return Err(ret::unexpected(call, r));
        }

        trace!(requested = n, moved, "skipped entries");
        Ok(requested - moved)
    }

    /// Cursor of the current entry.
    pub fn cursor(&mut self) -> Result<Cursor> {
        let (ops, raw) = self.handle.parts()?;
        let mut cursor = None;
        let r = ops.get_cursor(raw, &mut cursor);
        ret::entry(NativeCall::GetCursor, r)?;

        cursor
            .map(Cursor::from_native)
            .ok_or_else(|| ret::unexpected(NativeCall::GetCursor, r))
    }

    /// Whether the current entry is the one `cursor` identifies.
    ///
    /// A malformed cursor, or having no current entry, is reported as
    /// [`JournalError::InvalidCursor`].
    pub fn test_cursor(&mut self, cursor: &Cursor) -> Result<bool> {
        let (ops, raw) = self.handle.parts()?;
        ret::cursor(NativeCall::TestCursor, ops.test_cursor(raw, cursor.as_c_str()))
    }

    /// Seeks to the entry `cursor` identifies, without selecting it.
    pub fn seek_cursor_raw(&mut self, cursor: &Cursor) -> Result<()> {
        let (ops, raw) = self.handle.parts()?;
        ret::cursor(NativeCall::SeekCursor, ops.seek_cursor(raw, cursor.as_c_str()))?;
        Ok(())
    }

    /// Seeks to `cursor`, steps onto the closest entry and reports whether
    /// it is the one the cursor identifies.
    ///
    /// `false` means the entry no longer exists (rotated away, or filtered
    /// out) and the position is on its closest successor, if any.
    pub fn seek_cursor(&mut self, cursor: &Cursor) -> Result<bool> {
        self.seek_cursor_raw(cursor)?;
        if !self.move_to_next()? {
            return Ok(false);
        }
        self.test_cursor(cursor)
    }

    /// Realtime timestamp of the current entry.
    pub fn timestamp_usec(&mut self) -> Result<Microseconds> {
        let (ops, raw) = self.handle.parts()?;
        let mut usec = 0;
        ret::entry(NativeCall::GetRealtime, ops.get_realtime_usec(raw, &mut usec))?;
        Ok(Microseconds(usec))
    }

    pub fn timestamp(&mut self) -> Result<DateTime<Utc>> {
        Ok(self.timestamp_usec()?.to_datetime())
    }

    /// Timestamp of the current entry at the configured UTC offset.
    pub fn timestamp_local(&mut self) -> Result<DateTime<FixedOffset>> {
        let offset = self.utc_offset();
        Ok(self.timestamp_usec()?.to_datetime_with_offset(offset))
    }

    /// Timestamps of the earliest and the latest entry.
    pub fn cutoff(&mut self) -> Result<Period> {
        let (ops, raw) = self.handle.parts()?;
        let (mut from, mut until) = (0, 0);
        ret::cutoff(ops.get_cutoff_realtime_usec(raw, &mut from, &mut until))?;
        Ok(Period::new(from, until))
    }

    /// Steps onto an entry if the position is on none, moving forward or
    /// backward. Returns `false` if there is no entry in that direction.
    pub(crate) fn ensure_entry(&mut self, forward: bool) -> Result<bool> {
        match self.timestamp_usec() {
            Ok(_) => Ok(true),
            Err(JournalError::OutOfBounds) if forward => self.move_to_next(),
            Err(JournalError::OutOfBounds) => self.move_to_previous(),
            Err(e) => Err(e),
        }
    }

    /// Moves forward to the first entry at or after `target`.
    ///
    /// The scan starts with the entry after the current one. Returns `false`
    /// if the end of the journal is reached first.
    pub fn move_forward_until_time(&mut self, target: impl Into<Microseconds>) -> Result<bool> {
        let target = target.into();
        while self.move_to_next()? {
            if self.timestamp_usec()? >= target {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Moves backward to the latest entry at or before `target`.
    ///
    /// The scan starts with the current entry, or with the previous one when
    /// there is no current entry. Returns `false` if the start of the journal
    /// is reached first.
    pub fn move_backward_until_latest_time(
        &mut self,
        target: impl Into<Microseconds>,
    ) -> Result<bool> {
        let target = target.into();
        if !self.ensure_entry(false)? {
            return Ok(false);
        }

        loop {
            if self.timestamp_usec()? <= target {
                return Ok(true);
            }
            if !self.move_to_previous()? {
                return Ok(false);
            }
        }
    }

    /// Moves backward like
    /// [`move_backward_until_latest_time()`](Journal::move_backward_until_latest_time),
    /// then on to the earliest of the entries sharing that timestamp.
    pub fn move_backward_until_earliest_time(
        &mut self,
        target: impl Into<Microseconds>,
    ) -> Result<bool> {
        if !self.move_backward_until_latest_time(target)? {
            return Ok(false);
        }

        let anchor = self.timestamp_usec()?;
        loop {
            if !self.move_to_previous()? {
                // The first entry of the journal is part of the run, and the
                // position is still on it.
                return Ok(true);
            }
            if self.timestamp_usec()? != anchor {
                // One step too far: back onto the first entry of the run.
                return self.move_to_next();
            }
        }
    }
}
