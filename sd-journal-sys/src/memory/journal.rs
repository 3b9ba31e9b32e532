use super::MemorySource;
use super::cursor::CursorKey;
use super::matches::Matches;
use crate::errno::{EADDRNOTAVAIL, EINVAL, ENOENT};
use std::collections::BTreeSet;
use std::ffi::{CStr, CString, c_int};
use uuid::Uuid;

#[derive(Debug)]
struct StoredEntry {
    realtime: u64,
    seqnum: u64,
    seqnum_id: Uuid,
    boot_id: Uuid,
    payloads: Vec<Vec<u8>>,
}

impl StoredEntry {
    fn key(&self) -> CursorKey {
        CursorKey {
            seqnum_id: self.seqnum_id,
            seqnum: self.seqnum,
            boot_id: self.boot_id,
            realtime: self.realtime,
        }
    }

    fn payload(&self, field: &[u8]) -> Option<&[u8]> {
        self.payloads.iter().map(Vec::as_slice).find(|payload| {
            payload.len() > field.len()
                && payload.starts_with(field)
                && payload[field.len()] == b'='
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Head,
    Tail,
    /// On an entry.
    Entry(usize),
    /// Just before the given entry, after a cursor seek.
    Seek(usize),
}

/// An open session of the in-memory backend.
#[derive(Debug)]
pub struct MemoryJournal {
    entries: Vec<StoredEntry>,
    fields: Vec<CString>,
    next_field: usize,
    position: Position,
    matches: Matches,
    runtime: bool,
    persistent: bool,
}

pub(super) fn is_valid_field(field: &[u8]) -> bool {
    !field.is_empty()
        && field.len() <= 255
        && field
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || *b == b'_')
}

impl MemoryJournal {
    pub(super) fn new<'a>(sources: impl IntoIterator<Item = &'a MemorySource>) -> Self {
        let mut entries = Vec::new();
        let mut runtime = false;
        let mut persistent = false;

        for source in sources {
            runtime |= source.runtime;
            persistent |= !source.runtime;

            for (idx, entry) in source.entries.iter().enumerate() {
                entries.push(StoredEntry {
                    realtime: entry.realtime,
                    seqnum: idx as u64 + 1,
                    seqnum_id: source.seqnum_id,
                    boot_id: source.boot_id,
                    payloads: entry.payloads.clone(),
                });
            }
        }
        entries.sort_by_key(|e| (e.realtime, e.seqnum_id, e.seqnum));

        let names: BTreeSet<&[u8]> = entries
            .iter()
            .flat_map(|e| e.payloads.iter())
            .filter_map(|payload| {
                let eq = payload.iter().position(|&b| b == b'=')?;
                Some(&payload[..eq])
            })
            .collect();
        let fields = names
            .into_iter()
            .filter_map(|name| CString::new(name).ok())
            .collect();

        Self {
            entries,
            fields,
            next_field: 0,
            position: Position::Head,
            matches: Matches::default(),
            runtime,
            persistent,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn current(&self) -> Option<&StoredEntry> {
        match self.position {
            Position::Entry(idx) => self.entries.get(idx),
            _ => None,
        }
    }

    fn accepts(&self, idx: usize) -> bool {
        self.matches.test(&self.entries[idx].payloads)
    }

    pub(super) fn step_forward(&mut self) -> bool {
        let from = match self.position {
            Position::Head => 0,
            Position::Tail => return false,
            Position::Entry(idx) => idx + 1,
            Position::Seek(idx) => idx,
        };

        match (from..self.entries.len()).find(|&idx| self.accepts(idx)) {
            Some(idx) => {
                self.position = Position::Entry(idx);
                true
            }
            None => false,
        }
    }

    pub(super) fn step_backward(&mut self) -> bool {
        let until = match self.position {
            Position::Head => return false,
            Position::Tail => self.entries.len(),
            Position::Entry(idx) => idx,
            Position::Seek(idx) => idx + 1,
        };

        match (0..until.min(self.entries.len()))
            .rev()
            .find(|&idx| self.accepts(idx))
        {
            Some(idx) => {
                self.position = Position::Entry(idx);
                true
            }
            None => false,
        }
    }

    pub(super) fn skip(&mut self, skip: u64, forward: bool) -> c_int {
        let mut moved: c_int = 0;
        for _ in 0..skip {
            let stepped = if forward {
                self.step_forward()
            } else {
                self.step_backward()
            };
            if !stepped || moved == c_int::MAX {
                break;
            }
            moved += 1;
        }
        moved
    }

    pub(super) fn seek_head(&mut self) {
        self.position = Position::Head;
    }

    pub(super) fn seek_tail(&mut self) {
        self.position = Position::Tail;
    }

    pub(super) fn seek_cursor(&mut self, cursor: &CStr) -> c_int {
        let Some(key) = CursorKey::parse(cursor.to_bytes()) else {
            return -EINVAL;
        };

        let exact = self
            .entries
            .iter()
            .position(|e| e.seqnum_id == key.seqnum_id && e.seqnum == key.seqnum);
        let nearest = || self.entries.iter().position(|e| e.realtime >= key.realtime);

        self.position = match exact.or_else(nearest) {
            Some(idx) => Position::Seek(idx),
            None => Position::Tail,
        };
        0
    }

    pub(super) fn get_cursor(&self, ret: &mut Option<CString>) -> c_int {
        let Some(entry) = self.current() else {
            return -EADDRNOTAVAIL;
        };
        match entry.key().format() {
            Some(cursor) => {
                *ret = Some(cursor);
                0
            }
            None => -EINVAL,
        }
    }

    pub(super) fn test_cursor(&self, cursor: &CStr) -> c_int {
        let Some(entry) = self.current() else {
            return -EADDRNOTAVAIL;
        };
        let Some(key) = CursorKey::parse(cursor.to_bytes()) else {
            return -EINVAL;
        };
        (key.seqnum_id == entry.seqnum_id && key.seqnum == entry.seqnum) as c_int
    }

    pub(super) fn restart_fields(&mut self) {
        self.next_field = 0;
    }

    pub(super) fn enumerate_fields<'j>(&'j mut self, field: &mut Option<&'j CStr>) -> c_int {
        match self.fields.get(self.next_field) {
            Some(name) => {
                self.next_field += 1;
                *field = Some(name.as_c_str());
                1
            }
            None => 0,
        }
    }

    pub(super) fn get_data<'j>(&'j self, field: &CStr, data: &mut Option<&'j [u8]>) -> c_int {
        let field = field.to_bytes();
        if !is_valid_field(field) {
            return -EINVAL;
        }
        let Some(entry) = self.current() else {
            return -EADDRNOTAVAIL;
        };
        if !self.fields.iter().any(|known| known.to_bytes() == field) {
            return -EINVAL;
        }
        match entry.payload(field) {
            Some(payload) => {
                *data = Some(payload);
                0
            }
            None => -ENOENT,
        }
    }

    pub(super) fn add_match(&mut self, data: &[u8]) -> c_int {
        let Some(eq) = data.iter().position(|&b| b == b'=') else {
            return -EINVAL;
        };
        if !is_valid_field(&data[..eq]) {
            return -EINVAL;
        }
        self.matches.add_term(data);
        0
    }

    pub(super) fn add_disjunction(&mut self) {
        self.matches.add_disjunction();
    }

    pub(super) fn add_conjunction(&mut self) {
        self.matches.add_conjunction();
    }

    pub(super) fn flush_matches(&mut self) {
        self.matches.flush();
    }

    pub(super) fn cutoff(&self, from: &mut u64, to: &mut u64) -> c_int {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => {
                *from = first.realtime;
                *to = last.realtime;
                1
            }
            _ => 0,
        }
    }

    pub(super) fn realtime(&self, ret: &mut u64) -> c_int {
        match self.current() {
            Some(entry) => {
                *ret = entry.realtime;
                0
            }
            None => -EADDRNOTAVAIL,
        }
    }

    pub(super) fn usage(&self) -> u64 {
        self.entries
            .iter()
            .flat_map(|e| e.payloads.iter())
            .map(|payload| payload.len() as u64)
            .sum()
    }

    pub(super) fn has_runtime_files(&self) -> bool {
        self.runtime
    }

    pub(super) fn has_persistent_files(&self) -> bool {
        self.persistent
    }
}
