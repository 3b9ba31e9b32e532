//! The native operation set of `sd-journal`.
//!
//! [`NativeOps`] mirrors the `sd_journal_*` calls one to one. Every method
//! returns the raw integer code of the underlying call; interpreting it is
//! left to the caller, because the meaning of the code differs per call.
//!
//! Two backends are provided: [`LibSystemd`], which resolves the real library
//! at runtime, and [`MemoryBackend`], an in-process emulator with the same
//! return-code conventions.

pub mod errno;
pub mod flags;
pub mod libsystemd;
pub mod memory;
mod ops;

pub use libsystemd::{LibSystemd, LoadError, RawJournal};
pub use memory::{MemoryBackend, MemoryEntry, MemoryJournal, MemorySource, Origin};
pub use ops::NativeOps;
