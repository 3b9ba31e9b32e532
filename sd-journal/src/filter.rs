//! Match filters.
//!
//! Filters are built incrementally, exactly like `sd_journal_add_match`:
//!
//! - consecutive matches on the same field are OR'ed, matches on different
//!   fields are AND'ed;
//! - [`add_disjunction()`](Journal::add_disjunction) OR's everything since the
//!   previous operator with what follows;
//! - [`add_conjunction()`](Journal::add_conjunction) AND's everything since
//!   the previous conjunction with what follows.
//!
//! Conjunction binds looser than disjunction: `A, OR, B, AND, C` reads as
//! `(A OR B) AND C`.
//!
//! The filter lives in the native session. The journal also records every
//! operation in a [`FilterOp`] log so callers can inspect what was applied.

use crate::Journal;
use crate::error::{JournalError, NativeCall, Result};
use crate::field::{FieldName, JournalField};
use crate::ret;
use sd_journal_sys::NativeOps;
use std::fmt;
use tracing::trace;

/// One filter operation, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    /// A `FIELD=value` term.
    Match(Vec<u8>),
    Disjunction,
    Conjunction,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Match(term) => f.write_str(&String::from_utf8_lossy(term)),
            FilterOp::Disjunction => f.write_str("OR"),
            FilterOp::Conjunction => f.write_str("AND"),
        }
    }
}

fn term(field: &str, value: &[u8]) -> Vec<u8> {
    let mut term = Vec::with_capacity(field.len() + 1 + value.len());
    term.extend_from_slice(field.as_bytes());
    term.push(b'=');
    term.extend_from_slice(value);
    term
}

impl<O: NativeOps> Journal<O> {
    /// Adds a `field=value` match.
    ///
    /// The value is arbitrary bytes. The field name is validated, and trusted
    /// (`_`-prefixed) names are rejected; use
    /// [`add_field_match()`](Journal::add_field_match) for those.
    pub fn add_match(&mut self, field: &str, value: impl AsRef<[u8]>) -> Result<()> {
        let field = FieldName::for_match(field)?;
        self.push_match(term(field.as_str(), value.as_ref()))
    }

    /// Adds a `field=value` match with a text value.
    pub fn add_match_str(&mut self, field: &str, value: &str) -> Result<()> {
        self.add_match(field, value.as_bytes())
    }

    /// Adds a match on a well-known field, trusted fields included.
    pub fn add_field_match(&mut self, field: JournalField, value: impl AsRef<[u8]>) -> Result<()> {
        self.push_match(term(field.name(), value.as_ref()))
    }

    fn push_match(&mut self, term: Vec<u8>) -> Result<()> {
        let (ops, raw) = self.handle.parts()?;
        ret::status(NativeCall::AddMatch, ops.add_match(raw, &term))?;

        trace!(term = %String::from_utf8_lossy(&term), "added match");
        self.filters.push(FilterOp::Match(term));
        self.filters_active = true;
        Ok(())
    }

    /// OR's the matches added since the previous operator with the ones
    /// that follow.
    pub fn add_disjunction(&mut self) -> Result<()> {
        self.ensure_filter_defined()?;
        let (ops, raw) = self.handle.parts()?;
        ret::status(NativeCall::AddDisjunction, ops.add_disjunction(raw))?;
        self.push_operator(FilterOp::Disjunction);
        Ok(())
    }

    /// AND's the matches added since the previous conjunction with the ones
    /// that follow.
    pub fn add_conjunction(&mut self) -> Result<()> {
        self.ensure_filter_defined()?;
        let (ops, raw) = self.handle.parts()?;
        ret::status(NativeCall::AddConjunction, ops.add_conjunction(raw))?;
        self.push_operator(FilterOp::Conjunction);
        Ok(())
    }

    fn ensure_filter_defined(&self) -> Result<()> {
        if self.filters_active {
            Ok(())
        } else {
            Err(JournalError::NoFilterDefined)
        }
    }

    fn push_operator(&mut self, op: FilterOp) {
        trace!(%op, "added filter operator");
        self.filters.push(op);
    }

    /// Removes all matches and operators.
    pub fn reset_filters(&mut self) -> Result<()> {
        let (ops, raw) = self.handle.parts()?;
        ops.flush_matches(raw);

        trace!(ops = self.filters.len(), "reset filters");
        self.filters.clear();
        self.filters_active = false;
        Ok(())
    }

    /// True once a match was added and until the filters are reset.
    pub fn has_active_filters(&self) -> bool {
        self.filters_active
    }

    /// Filter operations applied so far, oldest first.
    pub fn filters(&self) -> &[FilterOp] {
        &self.filters
    }
}
