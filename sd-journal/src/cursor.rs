use crate::error::{JournalError, Result};
use std::ffi::{CStr, CString};
use std::fmt;
use std::str::FromStr;

/// An opaque token identifying one journal entry.
///
/// Cursors are produced by [`Journal::cursor`](crate::Journal::cursor) and
/// only ever handed back to the journal: the contents are never interpreted,
/// and two cursors are compared by asking the journal, not by comparing
/// strings.
#[derive(Debug, Clone)]
pub struct Cursor(CString);

impl Cursor {
    pub(crate) fn from_native(cursor: CString) -> Self {
        Self(cursor)
    }

    pub(crate) fn as_c_str(&self) -> &CStr {
        &self.0
    }

    /// The cursor text, for storing it between sessions.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        self.0.to_string_lossy()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl FromStr for Cursor {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(CString::new(s)?))
    }
}

impl TryFrom<Vec<u8>> for Cursor {
    type Error = JournalError;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self(CString::new(bytes)?))
    }
}
