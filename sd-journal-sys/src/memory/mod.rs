//! An in-process journal with the return-code conventions of libsystemd.
//!
//! A [`MemoryBackend`] holds a set of sources (the system journal, the user
//! journal, namespaces, single files and directories), each with its own
//! entries. Opening a session selects sources the way the corresponding
//! `sd_journal_open*` call selects journal files, and merges their entries
//! by realtime timestamp.
//!
//! Reading a field that no entry of the opened sources carries fails with
//! `-EINVAL`, which lets callers tell "never seen" from "absent here"
//! (`-ENOENT`).

mod cursor;
mod journal;
mod matches;

pub use journal::MemoryJournal;

use crate::NativeOps;
use crate::errno::{EINVAL, ENOENT};
use crate::flags::*;
use std::ffi::{CStr, CString, c_int};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

/// Where a source's files would live on a real system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    System,
    User,
    Namespace(String),
    File(PathBuf),
    Directory(PathBuf),
}

/// One journal entry: a realtime timestamp and its `FIELD=value` payloads.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    realtime: u64,
    payloads: Vec<Vec<u8>>,
}

impl MemoryEntry {
    pub fn new(realtime: u64) -> Self {
        Self {
            realtime,
            payloads: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, value: impl AsRef<[u8]>) -> Self {
        let value = value.as_ref();
        let mut payload = Vec::with_capacity(name.len() + 1 + value.len());
        payload.extend_from_slice(name.as_bytes());
        payload.push(b'=');
        payload.extend_from_slice(value);
        self.payloads.push(payload);
        self
    }
}

/// A group of entries sharing one origin, seqnum id and boot id.
#[derive(Debug, Clone)]
pub struct MemorySource {
    origin: Origin,
    runtime: bool,
    seqnum_id: Uuid,
    boot_id: Uuid,
    entries: Vec<MemoryEntry>,
}

impl MemorySource {
    /// A persistent source with no entries.
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            runtime: false,
            seqnum_id: Uuid::new_v4(),
            boot_id: Uuid::new_v4(),
            entries: Vec::new(),
        }
    }

    /// Marks the source as living under `/run` rather than `/var`.
    pub fn runtime(mut self) -> Self {
        self.runtime = true;
        self
    }

    pub fn entry(mut self, entry: MemoryEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(mut self, entries: impl IntoIterator<Item = MemoryEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    fn is_default(&self, flags: c_int) -> bool {
        let scoped = flags & (SD_JOURNAL_SYSTEM | SD_JOURNAL_CURRENT_USER) != 0;
        let wanted = match self.origin {
            Origin::System => !scoped || flags & SD_JOURNAL_SYSTEM != 0,
            Origin::User => !scoped || flags & SD_JOURNAL_CURRENT_USER != 0,
            _ => false,
        };
        wanted && self.visible(flags)
    }

    fn visible(&self, flags: c_int) -> bool {
        self.runtime || flags & SD_JOURNAL_RUNTIME_ONLY == 0
    }
}

/// The in-memory `NativeOps` backend. Clones share the same sources.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    sources: Arc<Vec<MemorySource>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: MemorySource) -> Self {
        Arc::make_mut(&mut self.sources).push(source);
        self
    }

    fn open_matching(
        &self,
        ret: &mut Option<MemoryJournal>,
        select: impl Fn(&MemorySource) -> bool,
    ) -> c_int {
        let journal = MemoryJournal::new(self.sources.iter().filter(|s| select(s)));
        trace!(entries = journal.entry_count(), "opened in-memory journal");
        *ret = Some(journal);
        0
    }
}

fn path_of(path: &CStr) -> Option<&Path> {
    path.to_str().ok().map(Path::new)
}

impl NativeOps for MemoryBackend {
    type Journal = MemoryJournal;

    fn open(&self, ret: &mut Option<MemoryJournal>, flags: c_int) -> c_int {
        if flags & !SD_JOURNAL_OPEN_MASK != 0 {
            return -EINVAL;
        }
        let all_namespaces = flags & SD_JOURNAL_ALL_NAMESPACES != 0;

        self.open_matching(ret, |s| match s.origin {
            Origin::Namespace(_) => all_namespaces && s.visible(flags),
            _ => s.is_default(flags),
        })
    }

    fn open_namespace(
        &self,
        ret: &mut Option<MemoryJournal>,
        namespace: Option<&CStr>,
        flags: c_int,
    ) -> c_int {
        let Some(namespace) = namespace else {
            return self.open(ret, flags);
        };
        if flags & !SD_JOURNAL_OPEN_MASK != 0 {
            return -EINVAL;
        }
        let Ok(namespace) = namespace.to_str() else {
            return -EINVAL;
        };

        let all_namespaces = flags & SD_JOURNAL_ALL_NAMESPACES != 0;
        let include_default =
            all_namespaces || flags & SD_JOURNAL_INCLUDE_DEFAULT_NAMESPACE != 0;

        self.open_matching(ret, |s| match &s.origin {
            Origin::Namespace(ns) => (all_namespaces || ns == namespace) && s.visible(flags),
            _ => include_default && s.is_default(flags),
        })
    }

    fn open_files(&self, ret: &mut Option<MemoryJournal>, paths: &[&CStr], flags: c_int) -> c_int {
        if flags != 0 {
            return -EINVAL;
        }

        let mut wanted = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(path) = path_of(path) else {
                return -EINVAL;
            };
            let known = self
                .sources
                .iter()
                .any(|s| matches!(&s.origin, Origin::File(p) if p == path));
            if !known {
                return -ENOENT;
            }
            wanted.push(path);
        }

        self.open_matching(ret, |s| {
            matches!(&s.origin, Origin::File(p) if wanted.contains(&p.as_path()))
        })
    }

    fn open_directory(&self, ret: &mut Option<MemoryJournal>, path: &CStr, flags: c_int) -> c_int {
        if flags & !SD_JOURNAL_DIRECTORY_MASK != 0 {
            return -EINVAL;
        }
        let Some(path) = path_of(path) else {
            return -EINVAL;
        };

        let in_directory =
            |s: &MemorySource| matches!(&s.origin, Origin::Directory(p) if p == path);
        if !self.sources.iter().any(in_directory) {
            return -ENOENT;
        }
        self.open_matching(ret, in_directory)
    }

    fn close(&self, j: MemoryJournal) {
        trace!(entries = j.entry_count(), "closed in-memory journal");
    }

    fn next(&self, j: &mut MemoryJournal) -> c_int {
        j.step_forward() as c_int
    }

    fn previous(&self, j: &mut MemoryJournal) -> c_int {
        j.step_backward() as c_int
    }

    fn next_skip(&self, j: &mut MemoryJournal, skip: u64) -> c_int {
        j.skip(skip, true)
    }

    fn previous_skip(&self, j: &mut MemoryJournal, skip: u64) -> c_int {
        j.skip(skip, false)
    }

    fn seek_head(&self, j: &mut MemoryJournal) -> c_int {
        j.seek_head();
        0
    }

    fn seek_tail(&self, j: &mut MemoryJournal) -> c_int {
        j.seek_tail();
        0
    }

    fn seek_cursor(&self, j: &mut MemoryJournal, cursor: &CStr) -> c_int {
        j.seek_cursor(cursor)
    }

    fn get_cursor(&self, j: &mut MemoryJournal, ret: &mut Option<CString>) -> c_int {
        j.get_cursor(ret)
    }

    fn test_cursor(&self, j: &mut MemoryJournal, cursor: &CStr) -> c_int {
        j.test_cursor(cursor)
    }

    fn restart_fields(&self, j: &mut MemoryJournal) {
        j.restart_fields();
    }

    fn enumerate_fields<'j>(
        &self,
        j: &'j mut MemoryJournal,
        field: &mut Option<&'j CStr>,
    ) -> c_int {
        j.enumerate_fields(field)
    }

    fn get_data<'j>(
        &self,
        j: &'j mut MemoryJournal,
        field: &CStr,
        data: &mut Option<&'j [u8]>,
    ) -> c_int {
        j.get_data(field, data)
    }

    fn add_match(&self, j: &mut MemoryJournal, data: &[u8]) -> c_int {
        j.add_match(data)
    }

    fn add_disjunction(&self, j: &mut MemoryJournal) -> c_int {
        j.add_disjunction();
        0
    }

    fn add_conjunction(&self, j: &mut MemoryJournal) -> c_int {
        j.add_conjunction();
        0
    }

    fn flush_matches(&self, j: &mut MemoryJournal) {
        j.flush_matches();
    }

    fn get_cutoff_realtime_usec(
        &self,
        j: &mut MemoryJournal,
        from: &mut u64,
        to: &mut u64,
    ) -> c_int {
        j.cutoff(from, to)
    }

    fn get_realtime_usec(&self, j: &mut MemoryJournal, ret: &mut u64) -> c_int {
        j.realtime(ret)
    }

    fn get_usage(&self, j: &mut MemoryJournal, bytes: &mut u64) -> c_int {
        *bytes = j.usage();
        0
    }

    fn has_runtime_files(&self, j: &mut MemoryJournal) -> c_int {
        j.has_runtime_files() as c_int
    }

    fn has_persistent_files(&self, j: &mut MemoryJournal) -> c_int {
        j.has_persistent_files() as c_int
    }
}
