//! The sd-journal match algebra.
//!
//! Matches form three levels. Terms added back to back make up a term set:
//! terms on the same field are OR'ed, terms on different fields are AND'ed.
//! `add_disjunction` closes the current term set and OR's it with the next
//! one. `add_conjunction` closes the current disjunction and AND's it with
//! the next one, so AND binds looser than OR.

type TermSet = Vec<Vec<u8>>;
type Disjunction = Vec<TermSet>;

#[derive(Debug, Default)]
pub(super) struct Matches {
    conjunction: Vec<Disjunction>,
}

fn field_of(term: &[u8]) -> &[u8] {
    let eq = term.iter().position(|&b| b == b'=').unwrap_or(term.len());
    &term[..eq]
}

fn term_set_matches(terms: &TermSet, payloads: &[Vec<u8>]) -> bool {
    terms.iter().all(|term| {
        let field = field_of(term);
        terms
            .iter()
            .filter(|other| field_of(other) == field)
            .any(|other| payloads.contains(other))
    })
}

impl Matches {
    pub fn add_term(&mut self, term: &[u8]) {
        if self.conjunction.is_empty() {
            self.conjunction.push(Disjunction::new());
        }
        let Some(disjunction) = self.conjunction.last_mut() else {
            return;
        };

        if disjunction.is_empty() {
            disjunction.push(TermSet::new());
        }
        let Some(terms) = disjunction.last_mut() else {
            return;
        };

        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_vec());
        }
    }

    /// No-op unless the current term set has terms.
    pub fn add_disjunction(&mut self) {
        let Some(disjunction) = self.conjunction.last_mut() else {
            return;
        };
        if disjunction.last().is_some_and(|terms| !terms.is_empty()) {
            disjunction.push(TermSet::new());
        }
    }

    /// No-op unless the current disjunction has terms.
    pub fn add_conjunction(&mut self) {
        let has_terms = self
            .conjunction
            .last()
            .is_some_and(|disjunction| disjunction.iter().any(|terms| !terms.is_empty()));
        if has_terms {
            self.conjunction.push(Disjunction::new());
        }
    }

    pub fn flush(&mut self) {
        self.conjunction.clear();
    }

    pub fn test(&self, payloads: &[Vec<u8>]) -> bool {
        self.conjunction.iter().all(|disjunction| {
            let mut sets = disjunction.iter().filter(|terms| !terms.is_empty()).peekable();
            sets.peek().is_none() || sets.any(|terms| term_set_matches(terms, payloads))
        })
    }
}
