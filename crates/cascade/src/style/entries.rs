use crate::condition::{StateExpression, StateSet, Truth};
use crate::types::StyleValue;

/// One local rule: a value that applies while `expression` holds, or always
/// when it is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct StateEntry {
    pub expression: Option<StateExpression>,
    pub value: StyleValue,
}

/// True when an `entry` considered before `candidate` hides it: the entry is
/// unconditional, or holds whenever the candidate holds.
pub fn shadows(entry: Option<&StateExpression>, candidate: Option<&StateExpression>) -> bool {
    match (entry, candidate) {
        (None, _) => true,
        (Some(entry), Some(candidate)) => entry.compare(candidate) == Truth::True,
        (Some(entry), None) => entry.is_tautology(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Insert {
    Unchanged,
    Replaced(usize),
    Inserted(usize),
}

/// Entries of one attribute, most specific first. The unconditional entry,
/// when present, is always last.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct StateEntries(Vec<StateEntry>);

impl StateEntries {
    pub(crate) fn insert(&mut self, expression: Option<StateExpression>, value: StyleValue) -> Insert {
        if let Some(index) = self.position(expression.as_ref()) {
            let entry = &mut self.0[index];
            if entry.value == value {
                return Insert::Unchanged;
            }
            entry.value = value;
            return Insert::Replaced(index);
        }

        let index = match &expression {
            None => self.0.len(),
            Some(new) => self
                .0
                .iter()
                .position(|existing| match &existing.expression {
                    None => true,
                    Some(existing) => new.implies(existing),
                })
                .unwrap_or(self.0.len()),
        };
        self.0.insert(index, StateEntry { expression, value });
        Insert::Inserted(index)
    }

    /// Appends without reordering; used when flattening an already ordered
    /// chain. Returns false when a structurally equal expression exists.
    pub(crate) fn push_unique(&mut self, entry: StateEntry) -> bool {
        if self.position(entry.expression.as_ref()).is_some() {
            return false;
        }
        self.0.push(entry);
        true
    }

    pub(crate) fn remove(&mut self, expression: Option<&StateExpression>) -> Option<(usize, StateEntry)> {
        let index = self.position(expression)?;
        Some((index, self.0.remove(index)))
    }

    pub(crate) fn position(&self, expression: Option<&StateExpression>) -> Option<usize> {
        self.0.iter().position(|e| e.expression.as_ref() == expression)
    }

    /// True when an entry before `index` shadows `candidate`.
    pub(crate) fn shadowed_before(&self, index: usize, candidate: Option<&StateExpression>) -> bool {
        self.0[..index.min(self.0.len())]
            .iter()
            .any(|e| shadows(e.expression.as_ref(), candidate))
    }

    pub(crate) fn resolve(&self, states: &StateSet) -> Option<&StyleValue> {
        self.0
            .iter()
            .find(|e| e.expression.as_ref().is_none_or(|x| x.evaluate(states)))
            .map(|e| &e.value)
    }

    pub(crate) fn expressions(&self) -> impl Iterator<Item = Option<&StateExpression>> {
        self.0.iter().map(|e| e.expression.as_ref())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &StateEntry> {
        self.0.iter()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
