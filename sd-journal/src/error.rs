use crate::flags::{OpenFlags, OpenMode};
use sd_journal_sys::LoadError;
use std::fmt;
use thiserror::Error;

/// The native call a return code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCall {
    Open,
    OpenNamespace,
    OpenFiles,
    OpenDirectory,
    Next,
    Previous,
    NextSkip,
    PreviousSkip,
    SeekHead,
    SeekTail,
    SeekCursor,
    GetCursor,
    TestCursor,
    EnumerateFields,
    GetData,
    AddMatch,
    AddDisjunction,
    AddConjunction,
    GetCutoffRealtime,
    GetRealtime,
    GetUsage,
    HasRuntimeFiles,
    HasPersistentFiles,
}

impl NativeCall {
    /// Name of the wrapped `libsystemd` symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            NativeCall::Open => "sd_journal_open",
            NativeCall::OpenNamespace => "sd_journal_open_namespace",
            NativeCall::OpenFiles => "sd_journal_open_files",
            NativeCall::OpenDirectory => "sd_journal_open_directory",
            NativeCall::Next => "sd_journal_next",
            NativeCall::Previous => "sd_journal_previous",
            NativeCall::NextSkip => "sd_journal_next_skip",
            NativeCall::PreviousSkip => "sd_journal_previous_skip",
            NativeCall::SeekHead => "sd_journal_seek_head",
            NativeCall::SeekTail => "sd_journal_seek_tail",
            NativeCall::SeekCursor => "sd_journal_seek_cursor",
            NativeCall::GetCursor => "sd_journal_get_cursor",
            NativeCall::TestCursor => "sd_journal_test_cursor",
            NativeCall::EnumerateFields => "sd_journal_enumerate_fields",
            NativeCall::GetData => "sd_journal_get_data",
            NativeCall::AddMatch => "sd_journal_add_match",
            NativeCall::AddDisjunction => "sd_journal_add_disjunction",
            NativeCall::AddConjunction => "sd_journal_add_conjunction",
            NativeCall::GetCutoffRealtime => "sd_journal_get_cutoff_realtime_usec",
            NativeCall::GetRealtime => "sd_journal_get_realtime_usec",
            NativeCall::GetUsage => "sd_journal_get_usage",
            NativeCall::HasRuntimeFiles => "sd_journal_has_runtime_files",
            NativeCall::HasPersistentFiles => "sd_journal_has_persistent_files",
        }
    }
}

impl fmt::Display for NativeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// strerror-style text for a negative native return code.
fn describe(code: &i32) -> String {
    let code = *code;
    match code.checked_neg() {
        Some(errno) if errno > 0 => std::io::Error::from_raw_os_error(errno).to_string(),
        _ => format!("return code {code}"),
    }
}

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("{call} failed: {}", describe(.code))]
    Numeric { call: NativeCall, code: i32 },

    #[error("{call} returned {code}, outside its documented range")]
    UnexpectedReturn { call: NativeCall, code: i64 },

    #[error("field data needs {needed} bytes but the buffer holds {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("failed to open journal ({mode}): {}", describe(.code))]
    FailedToOpen { mode: OpenMode, code: i32 },

    #[error("journal has no entries")]
    NoEntries,

    #[error("no current entry")]
    OutOfBounds,

    #[error("field {0} is not set on the current entry")]
    FieldEmpty(String),

    #[error("field {0} is unknown to the journal")]
    NoSuchField(String),

    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),

    #[error("no entry at the requested time")]
    TimeNotFound,

    #[error("no match defined before grouping operator")]
    NoFilterDefined,

    #[error("loop aborted by callback")]
    CallbackAbortedLoop,

    #[error("invalid cursor")]
    InvalidCursor,

    #[error("{mode} open does not accept flags {flags:?}")]
    InvalidOpenFlags { mode: OpenMode, flags: OpenFlags },

    #[error("empty list of journal files")]
    EmptyFileList,

    #[error("argument contains a NUL byte")]
    InteriorNul,

    #[error("journal is closed")]
    Closed,

    #[error("journal was opened by process {opened_by} and cannot be used after fork")]
    UsedAfterFork { opened_by: u32 },

    #[error("{0}")]
    Library(Box<LoadError>),
}

static_assertions::const_assert!(std::mem::size_of::<JournalError>() <= 32);

impl JournalError {
    /// The errno carried by a native failure, if any.
    pub fn errno(&self) -> Option<i32> {
        match self {
            JournalError::Numeric { code, .. } | JournalError::FailedToOpen { code, .. } => {
                code.checked_neg()
            }
            _ => None,
        }
    }
}

impl From<LoadError> for JournalError {
    fn from(e: LoadError) -> Self {
        JournalError::Library(Box::new(e))
    }
}

impl From<std::ffi::NulError> for JournalError {
    fn from(_: std::ffi::NulError) -> Self {
        JournalError::InteriorNul
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;
