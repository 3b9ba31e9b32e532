//! Ownership of one native journal session.

use crate::error::{JournalError, Result};
use crate::flags::{OpenFlags, OpenMode};
use sd_journal_sys::NativeOps;
use std::ffi::{CString, c_int};
use std::path::Path;
use tracing::{debug, warn};

/// An open native journal session.
///
/// The handle owns the session exclusively and closes it exactly once, either
/// through [`close()`](JournalHandle::close) or on drop. Once closed, or when
/// used from a process other than the one that opened it (after `fork`),
/// every operation fails with [`JournalError::Closed`] or
/// [`JournalError::UsedAfterFork`] without touching native code.
///
/// A handle may be sent to another thread but is never shared: all access
/// goes through `&mut self`.
pub struct JournalHandle<O: NativeOps> {
    ops: O,
    raw: Option<O::Journal>,
    mode: OpenMode,
    pid: u32,
}

impl<O: NativeOps> JournalHandle<O> {
    /// Opens the local journal files selected by `flags`.
    pub fn open(ops: O, flags: OpenFlags) -> Result<Self> {
        let mut raw = None;
        let r = ops.open(&mut raw, flags.raw());
        Self::opened(ops, raw, r, OpenMode::Flags, flags)
    }

    /// Opens all namespaces, the default used when no flags are given.
    pub fn open_default(ops: O) -> Result<Self> {
        Self::open(ops, OpenFlags::ALL_NAMESPACES)
    }

    /// Opens the journal files of `namespace`.
    ///
    /// `INCLUDE_DEFAULT_NAMESPACE` adds the default namespace,
    /// `ALL_NAMESPACES` every namespace.
    pub fn open_namespace(ops: O, namespace: &str, flags: OpenFlags) -> Result<Self> {
        let namespace = CString::new(namespace)?;
        let mut raw = None;
        let r = ops.open_namespace(&mut raw, Some(namespace.as_c_str()), flags.raw());
        Self::opened(ops, raw, r, OpenMode::Namespace, flags)
    }

    /// Opens an explicit list of journal files. No flags are accepted.
    pub fn open_files<P: AsRef<Path>>(ops: O, paths: &[P], flags: OpenFlags) -> Result<Self> {
        if !flags.is_empty() {
            return Err(JournalError::InvalidOpenFlags {
                mode: OpenMode::Files,
                flags,
            });
        }
        if paths.is_empty() {
            return Err(JournalError::EmptyFileList);
        }

        let paths = paths
            .iter()
            .map(|p| path_to_cstring(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let argv: Vec<_> = paths.iter().map(CString::as_c_str).collect();

        let mut raw = None;
        let r = ops.open_files(&mut raw, &argv, flags.raw());
        Self::opened(ops, raw, r, OpenMode::Files, flags)
    }

    /// Opens the journal files in `directory`.
    ///
    /// Only [`OpenFlags::DIRECTORY_OPEN`] flags are accepted. Relative paths
    /// are resolved against the current directory first.
    pub fn open_directory(ops: O, directory: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        if !OpenFlags::DIRECTORY_OPEN.contains(flags) {
            return Err(JournalError::InvalidOpenFlags {
                mode: OpenMode::Directory,
                flags: flags.difference(OpenFlags::DIRECTORY_OPEN),
            });
        }

        let directory = std::path::absolute(directory.as_ref()).map_err(|e| {
            warn!(error = %e, "cannot resolve journal directory");
            JournalError::FailedToOpen {
                mode: OpenMode::Directory,
                code: -e.raw_os_error().unwrap_or(sd_journal_sys::errno::EINVAL),
            }
        })?;
        let directory = path_to_cstring(&directory)?;

        let mut raw = None;
        let r = ops.open_directory(&mut raw, &directory, flags.raw());
        Self::opened(ops, raw, r, OpenMode::Directory, flags)
    }

    fn opened(
        ops: O,
        raw: Option<O::Journal>,
        r: c_int,
        mode: OpenMode,
        flags: OpenFlags,
    ) -> Result<Self> {
        match raw {
            Some(raw) if r == 0 => {
                debug!(%mode, ?flags, "opened journal");
                Ok(Self {
                    ops,
                    raw: Some(raw),
                    mode,
                    pid: std::process::id(),
                })
            }
            raw => {
                if let Some(raw) = raw {
                    ops.close(raw);
                }
                debug!(%mode, ?flags, code = r, "failed to open journal");
                Err(JournalError::FailedToOpen { mode, code: r })
            }
        }
    }

    /// Closes the session. Closing an already closed handle does nothing.
    pub fn close(&mut self) {
        if let Some(raw) = self.raw.take() {
            self.ops.close(raw);
            debug!(mode = %self.mode, "closed journal");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.raw.is_none()
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// The native operations and session, after checking that the session
    /// may still be used.
    pub(crate) fn parts(&mut self) -> Result<(&O, &mut O::Journal)> {
        if self.pid != std::process::id() {
            return Err(JournalError::UsedAfterFork {
                opened_by: self.pid,
            });
        }
        match self.raw.as_mut() {
            Some(raw) => Ok((&self.ops, raw)),
            None => Err(JournalError::Closed),
        }
    }
}

impl<O: NativeOps> Drop for JournalHandle<O> {
    fn drop(&mut self) {
        // A forked child must not close the parent's session.
        if self.pid != std::process::id() {
            std::mem::forget(self.raw.take());
            return;
        }
        self.close();
    }
}

impl<O: NativeOps> std::fmt::Debug for JournalHandle<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalHandle")
            .field("mode", &self.mode)
            .field("closed", &self.is_closed())
            .field("pid", &self.pid)
            .finish()
    }
}

fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    Ok(CString::new(path.as_os_str().as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_journal_sys::{MemoryBackend, MemoryEntry, MemorySource, Origin};

    fn backend() -> MemoryBackend {
        MemoryBackend::new().with_source(
            MemorySource::new(Origin::User).entry(MemoryEntry::new(1).field("MESSAGE", "hi")),
        )
    }

    #[test]
    fn close_is_idempotent() {
        let mut handle = JournalHandle::open(backend(), OpenFlags::CURRENT_USER).unwrap();
        assert!(!handle.is_closed());
        handle.close();
        handle.close();
        assert!(handle.is_closed());
        assert!(matches!(handle.parts(), Err(JournalError::Closed)));
    }

    #[test]
    fn native_open_failures_are_reported_with_the_mode() {
        let err = JournalHandle::open_files(backend(), &["/nope.journal"], OpenFlags::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            JournalError::FailedToOpen {
                mode: OpenMode::Files,
                code
            } if code == -sd_journal_sys::errno::ENOENT
        ));
    }

    #[test]
    fn invalid_flags_never_reach_native_code() {
        let err = JournalHandle::open_files(backend(), &["/a.journal"], OpenFlags::SYSTEM)
            .unwrap_err();
        assert!(matches!(err, JournalError::InvalidOpenFlags { mode: OpenMode::Files, .. }));

        let err = JournalHandle::open_directory(
            backend(),
            "/var/log/journal",
            OpenFlags::SYSTEM | OpenFlags::RUNTIME_ONLY,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            JournalError::InvalidOpenFlags {
                mode: OpenMode::Directory,
                flags
            } if flags == OpenFlags::RUNTIME_ONLY
        ));

        let no_paths: &[&str] = &[];
        assert!(matches!(
            JournalHandle::open_files(backend(), no_paths, OpenFlags::empty()),
            Err(JournalError::EmptyFileList)
        ));
    }
}
