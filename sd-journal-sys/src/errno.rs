//! Error numbers with a documented meaning in `sd_journal_*` return codes.
//!
//! Native calls report failures as negated errno values.

/// Field not present on the current entry.
pub use libc::ENOENT;

/// Invalid argument: malformed field name, cursor or flag set.
pub use libc::EINVAL;

/// No current entry: the read position is before the head or past the tail.
pub use libc::EADDRNOTAVAIL;

/// The handle was opened by a different process.
pub use libc::ECHILD;
