//! Field reads on the current entry.
//!
//! Native payloads have the form `FIELD=value` and point into memory owned by
//! the session, valid only until the next call on it. Every read here copies
//! the payload out once before returning, into either a caller buffer or a
//! freshly allocated value.
//!
//! Caller-supplied names are validated before they reach native code.
//! Predefined [`JournalField`]s skip the check.

use crate::Journal;
use crate::error::{JournalError, NativeCall, Result};
use crate::field::{FieldName, JournalField};
use crate::ret;
use sd_journal_sys::NativeOps;
use std::ffi::CString;
use tracing::trace;

/// Drops the `FIELD=` prefix of a payload.
fn value_of(payload: &[u8]) -> &[u8] {
    match payload.iter().position(|&b| b == b'=') {
        Some(eq) => &payload[eq + 1..],
        None => payload,
    }
}

/// Converts a read that found no value on this entry into `None`.
fn absent_if_empty<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(JournalError::FieldEmpty(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

impl<O: NativeOps> Journal<O> {
    /// Runs `f` on the native payload of `field`.
    fn with_payload<T>(&mut self, field: &str, f: impl FnOnce(&[u8]) -> Result<T>) -> Result<T> {
        let name = CString::new(field)?;
        let (ops, raw) = self.handle.parts()?;

        let mut data = None;
        let r = ops.get_data(raw, &name, &mut data);
        ret::data(r, field)?;

        let payload = data.ok_or_else(|| ret::unexpected(NativeCall::GetData, r))?;
        trace!(field, len = payload.len(), "read field");
        f(payload)
    }

    /// Copies the raw `FIELD=value` payload into `dest`, returning its length.
    ///
    /// Fails with [`JournalError::BufferTooSmall`] without writing anything
    /// if `dest` cannot hold the whole payload.
    pub fn read_raw_into(&mut self, field: &str, dest: &mut [u8]) -> Result<usize> {
        FieldName::new(field)?;
        let capacity = dest.len();
        self.with_payload(field, |payload| {
            let Some(dest) = dest.get_mut(..payload.len()) else {
                return Err(JournalError::BufferTooSmall {
                    needed: payload.len(),
                    capacity,
                });
            };
            dest.copy_from_slice(payload);
            Ok(payload.len())
        })
    }

    /// The raw `FIELD=value` payload.
    pub fn read_raw(&mut self, field: &str) -> Result<Vec<u8>> {
        FieldName::new(field)?;
        self.with_payload(field, |payload| Ok(payload.to_vec()))
    }

    /// The raw `FIELD=value` payload of a well-known field, as text.
    pub fn read_raw_string(&mut self, field: JournalField) -> Result<String> {
        self.with_payload(field.name(), |payload| {
            Ok(String::from_utf8_lossy(payload).into_owned())
        })
    }

    /// The value of `field`, without the `FIELD=` prefix.
    pub fn read_bytes(&mut self, field: &str) -> Result<Vec<u8>> {
        FieldName::new(field)?;
        self.with_payload(field, |payload| Ok(value_of(payload).to_vec()))
    }

    pub fn read_field_bytes(&mut self, field: JournalField) -> Result<Vec<u8>> {
        self.with_payload(field.name(), |payload| Ok(value_of(payload).to_vec()))
    }

    /// The value of `field` as text. Invalid UTF-8 is replaced with U+FFFD.
    pub fn read_string(&mut self, field: &str) -> Result<String> {
        FieldName::new(field)?;
        self.with_payload(field, |payload| {
            Ok(String::from_utf8_lossy(value_of(payload)).into_owned())
        })
    }

    pub fn read_field(&mut self, field: JournalField) -> Result<String> {
        self.with_payload(field.name(), |payload| {
            Ok(String::from_utf8_lossy(value_of(payload)).into_owned())
        })
    }

    /// `MESSAGE` of the current entry.
    pub fn read_message(&mut self) -> Result<String> {
        self.read_field(JournalField::Message)
    }

    /// Length of the raw `FIELD=value` payload.
    pub fn data_size(&mut self, field: &str) -> Result<usize> {
        FieldName::new(field)?;
        self.with_payload(field, |payload| Ok(payload.len()))
    }

    /// Reads each of `fields` as text into `target`.
    ///
    /// A field that is not set on the current entry is recorded as `None`.
    /// Any other error stops the batch; values read until then stay in
    /// `target`.
    pub fn read_fields_as_strings<'a, I, M>(&mut self, fields: I, target: &mut M) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
        M: Extend<(String, Option<String>)>,
    {
        for field in fields {
            let value = absent_if_empty(self.read_string(field))?;
            target.extend(Some((field.to_owned(), value)));
        }
        Ok(())
    }

    /// Reads each of the well-known `fields` as text into `target`, with the
    /// same policy as [`read_fields_as_strings()`](Journal::read_fields_as_strings).
    pub fn read_journal_fields<I, M>(&mut self, fields: I, target: &mut M) -> Result<()>
    where
        I: IntoIterator<Item = JournalField>,
        M: Extend<(JournalField, Option<String>)>,
    {
        for field in fields {
            let value = absent_if_empty(self.read_field(field))?;
            target.extend(Some((field, value)));
        }
        Ok(())
    }
}
