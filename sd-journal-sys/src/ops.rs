use std::ffi::{CStr, CString, c_int};

/// The primitive `sd_journal_*` operations.
///
/// Methods take the native session by reference and return the raw code of
/// the call they wrap. Out-parameters are `&mut` arguments that are written
/// only when the call reports success.
///
/// Field payloads and enumerated field names point into memory owned by the
/// native session. They are handed out with the lifetime of the `&mut`
/// session borrow, so they cannot be held across the next call on the same
/// session.
///
/// A session is single-threaded: it may be moved to another thread, but it
/// must never be used from two threads at once.
pub trait NativeOps {
    /// The native session, `sd_journal *` for the real library.
    type Journal;

    /// `sd_journal_open`
    fn open(&self, ret: &mut Option<Self::Journal>, flags: c_int) -> c_int;

    /// `sd_journal_open_namespace`
    fn open_namespace(
        &self,
        ret: &mut Option<Self::Journal>,
        namespace: Option<&CStr>,
        flags: c_int,
    ) -> c_int;

    /// `sd_journal_open_files`
    fn open_files(&self, ret: &mut Option<Self::Journal>, paths: &[&CStr], flags: c_int)
    -> c_int;

    /// `sd_journal_open_directory`
    fn open_directory(
        &self,
        ret: &mut Option<Self::Journal>,
        path: &CStr,
        flags: c_int,
    ) -> c_int;

    /// `sd_journal_close`. Consumes the session.
    fn close(&self, j: Self::Journal);

    /// `sd_journal_next`: 1 moved, 0 at the tail, negative errno.
    fn next(&self, j: &mut Self::Journal) -> c_int;

    /// `sd_journal_previous`: 1 moved, 0 at the head, negative errno.
    fn previous(&self, j: &mut Self::Journal) -> c_int;

    /// `sd_journal_next_skip`: number of entries actually skipped.
    fn next_skip(&self, j: &mut Self::Journal, skip: u64) -> c_int;

    /// `sd_journal_previous_skip`: number of entries actually skipped.
    fn previous_skip(&self, j: &mut Self::Journal, skip: u64) -> c_int;

    /// `sd_journal_seek_head`
    fn seek_head(&self, j: &mut Self::Journal) -> c_int;

    /// `sd_journal_seek_tail`
    fn seek_tail(&self, j: &mut Self::Journal) -> c_int;

    /// `sd_journal_seek_cursor`
    fn seek_cursor(&self, j: &mut Self::Journal, cursor: &CStr) -> c_int;

    /// `sd_journal_get_cursor`. The returned string is owned by the caller.
    fn get_cursor(&self, j: &mut Self::Journal, ret: &mut Option<CString>) -> c_int;

    /// `sd_journal_test_cursor`: positive if the current entry matches.
    fn test_cursor(&self, j: &mut Self::Journal, cursor: &CStr) -> c_int;

    /// `sd_journal_restart_fields`
    fn restart_fields(&self, j: &mut Self::Journal);

    /// `sd_journal_enumerate_fields`: 1 and a name, or 0 when exhausted.
    fn enumerate_fields<'j>(
        &self,
        j: &'j mut Self::Journal,
        field: &mut Option<&'j CStr>,
    ) -> c_int;

    /// `sd_journal_get_data`. The payload keeps its `FIELD=` prefix.
    fn get_data<'j>(
        &self,
        j: &'j mut Self::Journal,
        field: &CStr,
        data: &mut Option<&'j [u8]>,
    ) -> c_int;

    /// `sd_journal_add_match`
    fn add_match(&self, j: &mut Self::Journal, data: &[u8]) -> c_int;

    /// `sd_journal_add_disjunction`
    fn add_disjunction(&self, j: &mut Self::Journal) -> c_int;

    /// `sd_journal_add_conjunction`
    fn add_conjunction(&self, j: &mut Self::Journal) -> c_int;

    /// `sd_journal_flush_matches`
    fn flush_matches(&self, j: &mut Self::Journal);

    /// `sd_journal_get_cutoff_realtime_usec`: 1 with both bounds set, 0 when
    /// the journal holds no entries.
    fn get_cutoff_realtime_usec(&self, j: &mut Self::Journal, from: &mut u64, to: &mut u64)
    -> c_int;

    /// `sd_journal_get_realtime_usec`
    fn get_realtime_usec(&self, j: &mut Self::Journal, ret: &mut u64) -> c_int;

    /// `sd_journal_get_usage`
    fn get_usage(&self, j: &mut Self::Journal, bytes: &mut u64) -> c_int;

    /// `sd_journal_has_runtime_files`
    fn has_runtime_files(&self, j: &mut Self::Journal) -> c_int;

    /// `sd_journal_has_persistent_files`
    fn has_persistent_files(&self, j: &mut Self::Journal) -> c_int;
}
