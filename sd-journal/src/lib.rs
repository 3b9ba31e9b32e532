//! Typed access to the systemd journal.
//!
//! [`Journal`] wraps one `sd_journal` session: it opens journal files,
//! moves a read position over their entries, applies match filters, reads
//! fields of the current entry, and scans entries within a time window.
//! Native return codes are decoded into [`JournalError`] at the boundary, and
//! nothing borrowed from native memory outlives the call that produced it.
//!
//! The native calls go through [`NativeOps`]. [`LibSystemd`] binds them to
//! `libsystemd` at runtime; [`MemoryBackend`] serves the same contract from
//! in-memory entries.
//!
//! ```no_run
//! use sd_journal::{Journal, JournalField, OpenFlags};
//!
//! # fn main() -> sd_journal::Result<()> {
//! let mut journal = Journal::open(OpenFlags::LOCAL_ONLY)?;
//! journal.add_field_match(JournalField::SystemdUnit, "sshd.service")?;
//! journal.move_to_latest()?;
//! while journal.move_to_previous()? {
//!     println!("{} {}", journal.timestamp()?, journal.read_message()?);
//! }
//! # Ok(())
//! # }
//! ```

mod cursor;
mod error;
mod field;
mod filter;
mod flags;
mod handle;
mod journal;
mod navigate;
mod options;
mod range;
mod read;
mod ret;

pub use cursor::Cursor;
pub use error::{JournalError, NativeCall, Result};
pub use field::{FieldKind, FieldName, JournalField, is_field_name_valid, validate_field_name};
pub use filter::FilterOp;
pub use flags::{OpenFlags, OpenMode};
pub use handle::JournalHandle;
pub use journal::Journal;
pub use options::JournalOptions;

pub use journal_common::{Microseconds, Period};
pub use sd_journal_sys::{
    LibSystemd, LoadError, MemoryBackend, MemoryEntry, MemorySource, NativeOps, Origin,
};
