use crate::error::{NativeCall, Result};
use crate::field::JournalField;
use crate::filter::FilterOp;
use crate::flags::OpenFlags;
use crate::handle::JournalHandle;
use crate::options::JournalOptions;
use crate::ret;
use chrono::FixedOffset;
use sd_journal_sys::{LibSystemd, NativeOps};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::trace;

/// A journal reader.
///
/// Wraps a [`JournalHandle`] together with the state that belongs to it: the
/// filter terms added so far and the reader's options. Navigation, filtering,
/// field reads and time-range scans are implemented in their own modules as
/// `impl` blocks on this type.
///
/// A `Journal` is not meant to be used from more than one thread at a time.
/// It is `Send` when its backend is, and every operation takes `&mut self`,
/// so sharing one requires external synchronization.
pub struct Journal<O: NativeOps = LibSystemd> {
    pub(crate) handle: JournalHandle<O>,
    pub(crate) filters: Vec<FilterOp>,
    pub(crate) filters_active: bool,
    options: JournalOptions,
}

impl Journal<LibSystemd> {
    /// Opens the local journal through `libsystemd`.
    pub fn open(flags: OpenFlags) -> Result<Self> {
        Ok(Self::new(JournalHandle::open(LibSystemd::get()?, flags)?))
    }

    /// Opens every namespace through `libsystemd`.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(JournalHandle::open_default(LibSystemd::get()?)?))
    }

    pub fn open_namespace(namespace: &str, flags: OpenFlags) -> Result<Self> {
        let ops = LibSystemd::get()?;
        Ok(Self::new(JournalHandle::open_namespace(ops, namespace, flags)?))
    }

    pub fn open_files<P: AsRef<Path>>(paths: &[P], flags: OpenFlags) -> Result<Self> {
        let ops = LibSystemd::get()?;
        Ok(Self::new(JournalHandle::open_files(ops, paths, flags)?))
    }

    pub fn open_directory(directory: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        let ops = LibSystemd::get()?;
        Ok(Self::new(JournalHandle::open_directory(ops, directory, flags)?))
    }
}

impl<O: NativeOps> Journal<O> {
    pub fn new(handle: JournalHandle<O>) -> Self {
        Self::with_options(handle, JournalOptions::default())
    }

    pub fn with_options(handle: JournalHandle<O>, options: JournalOptions) -> Self {
        Self {
            handle,
            filters: Vec::new(),
            filters_active: false,
            options,
        }
    }

    pub fn handle(&self) -> &JournalHandle<O> {
        &self.handle
    }

    pub fn options(&self) -> &JournalOptions {
        &self.options
    }

    /// Closes the underlying session and forgets all filter terms.
    pub fn close(&mut self) {
        self.handle.close();
        self.filters.clear();
        self.filters_active = false;
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Offset used by [`timestamp_local()`](Journal::timestamp_local).
    pub fn utc_offset(&self) -> FixedOffset {
        self.options.utc_offset()
    }

    pub fn set_utc_offset(&mut self, offset: FixedOffset) {
        self.options.utc_offset_seconds = offset.local_minus_utc();
    }

    /// Names of all fields present in the opened journal files.
    pub fn available_field_names(&mut self) -> Result<BTreeSet<String>> {
        let (ops, raw) = self.handle.parts()?;
        ops.restart_fields(raw);

        let mut names = BTreeSet::new();
        loop {
            let mut field = None;
            let r = ops.enumerate_fields(raw, &mut field);
            if !ret::step(NativeCall::EnumerateFields, r)? {
                break;
            }
            let field = field.ok_or_else(|| ret::unexpected(NativeCall::EnumerateFields, r))?;
            names.insert(field.to_string_lossy().into_owned());
        }

        Ok(names)
    }

    /// Well-known fields present in the opened journal files. Other field
    /// names are skipped.
    pub fn available_fields(&mut self) -> Result<BTreeSet<JournalField>> {
        let names = self.available_field_names()?;
        let fields = names
            .iter()
            .filter_map(|name| {
                let field = JournalField::lookup(name);
                if field.is_none() {
                    trace!(%name, "skipping unknown field");
                }
                field
            })
            .collect();
        Ok(fields)
    }

    /// Disk space used by the opened journal files, in bytes.
    pub fn usage(&mut self) -> Result<u64> {
        let (ops, raw) = self.handle.parts()?;
        let mut bytes = 0;
        ret::status(NativeCall::GetUsage, ops.get_usage(raw, &mut bytes))?;
        Ok(bytes)
    }

    /// Whether any opened journal file is volatile.
    pub fn has_runtime_files(&mut self) -> Result<bool> {
        let (ops, raw) = self.handle.parts()?;
        ret::boolean(NativeCall::HasRuntimeFiles, ops.has_runtime_files(raw))
    }

    /// Whether any opened journal file is persistent.
    pub fn has_persistent_files(&mut self) -> Result<bool> {
        let (ops, raw) = self.handle.parts()?;
        ret::boolean(NativeCall::HasPersistentFiles, ops.has_persistent_files(raw))
    }
}

impl<O: NativeOps> From<JournalHandle<O>> for Journal<O> {
    fn from(handle: JournalHandle<O>) -> Self {
        Self::new(handle)
    }
}

impl<O: NativeOps> std::fmt::Debug for Journal<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("handle", &self.handle)
            .field("filters", &self.filters)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
