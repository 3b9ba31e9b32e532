//! Decoders for native return codes.
//!
//! `sd_journal_*` calls overload a single `int`: depending on the call it
//! means success, a boolean, a count, or a negated errno. Each decoder here
//! handles exactly one of those conventions, and every native call is passed
//! through the decoder matching its documented behaviour.

use crate::error::{JournalError, NativeCall, Result};
use sd_journal_sys::errno::{EADDRNOTAVAIL, EINVAL, ENOENT};
use std::ffi::c_int;
use tracing::warn;

fn numeric(call: NativeCall, code: c_int) -> JournalError {
    JournalError::Numeric { call, code }
}

pub(crate) fn unexpected(call: NativeCall, code: impl Into<i64>) -> JournalError {
    let code = code.into();
    warn!(%call, code, "native call returned a value outside its documented range");
    JournalError::UnexpectedReturn { call, code }
}

/// `0` on success.
pub(crate) fn status(call: NativeCall, r: c_int) -> Result<()> {
    match r {
        0 => Ok(()),
        r if r < 0 => Err(numeric(call, r)),
        r => Err(unexpected(call, r)),
    }
}

/// `1` moved, `0` did not move.
pub(crate) fn step(call: NativeCall, r: c_int) -> Result<bool> {
    match r {
        1 => Ok(true),
        0 => Ok(false),
        r if r < 0 => Err(numeric(call, r)),
        r => Err(unexpected(call, r)),
    }
}

/// Non-negative count.
pub(crate) fn count(call: NativeCall, r: c_int) -> Result<u64> {
    if r < 0 {
        return Err(numeric(call, r));
    }
    Ok(r as u64)
}

/// Positive for true, `0` for false.
pub(crate) fn boolean(call: NativeCall, r: c_int) -> Result<bool> {
    if r < 0 {
        return Err(numeric(call, r));
    }
    Ok(r > 0)
}

/// `0` on success; no current entry is reported as `OutOfBounds`.
pub(crate) fn entry(call: NativeCall, r: c_int) -> Result<()> {
    match r {
        r if r == -EADDRNOTAVAIL => Err(JournalError::OutOfBounds),
        r => status(call, r),
    }
}

/// Cursor seek and test: a malformed cursor, or testing without a current
/// entry, is a caller error.
pub(crate) fn cursor(call: NativeCall, r: c_int) -> Result<bool> {
    match r {
        r if r == -EINVAL || r == -EADDRNOTAVAIL => Err(JournalError::InvalidCursor),
        r => boolean(call, r),
    }
}

/// `sd_journal_get_data`.
pub(crate) fn data(r: c_int, field: &str) -> Result<()> {
    match r {
        0 => Ok(()),
        r if r == -ENOENT => Err(JournalError::FieldEmpty(field.to_owned())),
        r if r == -EINVAL => Err(JournalError::NoSuchField(field.to_owned())),
        r if r == -EADDRNOTAVAIL => Err(JournalError::OutOfBounds),
        r if r < 0 => Err(numeric(NativeCall::GetData, r)),
        r => Err(unexpected(NativeCall::GetData, r)),
    }
}

/// `1` with both bounds written, `0` for an empty journal.
pub(crate) fn cutoff(r: c_int) -> Result<()> {
    match r {
        1 => Ok(()),
        0 => Err(JournalError::NoEntries),
        r if r < 0 => Err(numeric(NativeCall::GetCutoffRealtime, r)),
        r => Err(unexpected(NativeCall::GetCutoffRealtime, r)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_rejects_values_above_one() {
        assert!(step(NativeCall::Next, 1).unwrap());
        assert!(!step(NativeCall::Next, 0).unwrap());
        assert!(matches!(
            step(NativeCall::Next, 2),
            Err(JournalError::UnexpectedReturn {
                call: NativeCall::Next,
                code: 2
            })
        ));
        assert!(matches!(
            step(NativeCall::Previous, -5),
            Err(JournalError::Numeric { code: -5, .. })
        ));
    }

    #[test]
    fn data_codes_map_to_field_errors() {
        assert!(matches!(data(-ENOENT, "A"), Err(JournalError::FieldEmpty(f)) if f == "A"));
        assert!(matches!(data(-EINVAL, "A"), Err(JournalError::NoSuchField(_))));
        assert!(matches!(data(-EADDRNOTAVAIL, "A"), Err(JournalError::OutOfBounds)));
        assert!(matches!(data(-1, "A"), Err(JournalError::Numeric { code: -1, .. })));
    }

    #[test]
    fn cursor_caller_errors() {
        assert!(matches!(
            cursor(NativeCall::TestCursor, -EINVAL),
            Err(JournalError::InvalidCursor)
        ));
        assert!(matches!(
            cursor(NativeCall::TestCursor, -EADDRNOTAVAIL),
            Err(JournalError::InvalidCursor)
        ));
        assert!(cursor(NativeCall::TestCursor, 3).unwrap());
    }

    #[test]
    fn cutoff_zero_means_no_entries() {
        assert!(cutoff(1).is_ok());
        assert!(matches!(cutoff(0), Err(JournalError::NoEntries)));
    }
}
