use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{CascadeError, Result};

use super::parse::parse_state_expression;

/// An interned state, group, slot or type name.
pub type Name = Rc<str>;

/// Above this many distinct states, [`StateExpression::compare`] stops
/// enumerating assignments and answers `Indeterminate`, and
/// [`StateExpression::satisfying_fraction`] falls back to an estimate.
pub const MAX_EXACT_STATES: usize = 16;

/// A set of names: an element's active states or its groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameSet(BTreeSet<Name>);

pub type StateSet = NameSet;
pub type GroupSet = NameSet;

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns true if the name was not already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.0.contains(name) {
            return false;
        }
        self.0.insert(Name::from(name))
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    pub fn is_superset(&self, other: &NameSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|n| &**n)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for NameSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(Name::from).collect())
    }
}

/// Result of evaluating one expression under the assumption that another holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Truth {
    /// True in every state set where the assumption holds.
    True,
    /// False in every state set where the assumption holds.
    False,
    /// Depends on states the assumption does not pin down.
    Indeterminate,
}

/// Boolean formula over active state names.
///
/// Build with [`StateExpression::state`] and the `!`, `&`, `|` operators, or
/// parse the same syntax. `true` and `false` are literals, not state names.
/// Expressions built that way never hold a one-term `And`/`Or` or an `And`
/// directly inside an `And` (likewise for `Or`), and their `Display` output
/// parses back to an equal expression.
///
/// ```
/// use cascade::StateExpression;
///
/// let expr = StateExpression::state("hover") & !StateExpression::state("disabled");
/// assert_eq!(expr, "hover & !disabled".parse().unwrap());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StateExpression {
    State(Name),
    Not(Box<StateExpression>),
    /// Conjunction; empty means always true.
    And(Vec<StateExpression>),
    /// Disjunction; empty means always false.
    Or(Vec<StateExpression>),
}

impl StateExpression {
    pub fn state(name: &str) -> Self {
        StateExpression::State(Name::from(name))
    }

    /// The expression that always holds, written `true`.
    pub fn always() -> Self {
        StateExpression::And(Vec::new())
    }

    /// The expression that never holds, written `false`.
    pub fn never() -> Self {
        StateExpression::Or(Vec::new())
    }

    /// Conjunction of `terms`, flattened like `&`.
    pub fn all(terms: impl IntoIterator<Item = StateExpression>) -> Self {
        terms.into_iter().fold(Self::always(), |acc, t| acc & t)
    }

    /// Disjunction of `terms`, flattened like `|`.
    pub fn any(terms: impl IntoIterator<Item = StateExpression>) -> Self {
        terms.into_iter().fold(Self::never(), |acc, t| acc | t)
    }

    pub fn parse(input: &str) -> Result<Self> {
        match parse_state_expression(input) {
            Ok((rest, expr)) if rest.trim().is_empty() => Ok(expr),
            Ok((rest, _)) => Err(CascadeError::InvalidStateExpression(format!(
                "unexpected input at `{}`",
                rest.trim()
            ))),
            Err(e) => Err(CascadeError::InvalidStateExpression(e.to_string())),
        }
    }

    pub fn evaluate(&self, states: &StateSet) -> bool {
        self.eval_by(&|name| states.contains(name))
    }

    fn eval_by(&self, active: &dyn Fn(&str) -> bool) -> bool {
        match self {
            StateExpression::State(name) => active(name),
            StateExpression::Not(inner) => !inner.eval_by(active),
            StateExpression::And(terms) => terms.iter().all(|t| t.eval_by(active)),
            StateExpression::Or(terms) => terms.iter().any(|t| t.eval_by(active)),
        }
    }

    /// Every state name mentioned by the expression.
    pub fn states(&self) -> BTreeSet<Name> {
        let mut out = BTreeSet::new();
        self.collect_states(&mut out);
        out
    }

    fn collect_states(&self, out: &mut BTreeSet<Name>) {
        match self {
            StateExpression::State(name) => {
                out.insert(Rc::clone(name));
            }
            StateExpression::Not(inner) => inner.collect_states(out),
            StateExpression::And(terms) | StateExpression::Or(terms) => {
                terms.iter().for_each(|t| t.collect_states(out));
            }
        }
    }

    /// Evaluates `self` assuming `assumption` holds.
    ///
    /// The answer is semantic: every assignment of the states mentioned by
    /// either expression is checked, so the relation is consistent and
    /// transitive. An unsatisfiable assumption makes everything `True`.
    pub fn compare(&self, assumption: &StateExpression) -> Truth {
        if self == assumption {
            return Truth::True;
        }
        let mut names = self.states();
        names.extend(assumption.states());
        if names.len() > MAX_EXACT_STATES {
            log::trace!(
                "state comparison over {} states is not enumerated",
                names.len()
            );
            return Truth::Indeterminate;
        }

        let names: Vec<Name> = names.into_iter().collect();
        let (mut seen_true, mut seen_false) = (false, false);
        for bits in 0u32..(1u32 << names.len()) {
            let active = |name: &str| {
                names
                    .iter()
                    .position(|n| &**n == name)
                    .is_some_and(|i| bits & (1 << i) != 0)
            };
            if !assumption.eval_by(&active) {
                continue;
            }
            if self.eval_by(&active) {
                seen_true = true;
            } else {
                seen_false = true;
            }
            if seen_true && seen_false {
                return Truth::Indeterminate;
            }
        }
        if seen_false { Truth::False } else { Truth::True }
    }

    /// Share of the assignments of the mentioned states under which the
    /// expression holds, from 0.0 (never) to 1.0 (always).
    ///
    /// Mentioning an extra state does not change the share, and an
    /// expression that strictly implies another has a strictly smaller one.
    /// Both hold exactly up to [`MAX_EXACT_STATES`] states; larger
    /// expressions get an estimate that treats every occurrence as an
    /// independent coin flip.
    pub fn satisfying_fraction(&self) -> f64 {
        let names: Vec<Name> = self.states().into_iter().collect();
        if names.len() > MAX_EXACT_STATES {
            return self.estimated_fraction();
        }
        let satisfied = (0u32..(1u32 << names.len()))
            .filter(|&bits| {
                self.eval_by(&|name: &str| {
                    names
                        .iter()
                        .position(|n| &**n == name)
                        .is_some_and(|i| bits & (1 << i) != 0)
                })
            })
            .count();
        satisfied as f64 / (1u64 << names.len()) as f64
    }

    fn estimated_fraction(&self) -> f64 {
        match self {
            StateExpression::State(_) => 0.5,
            StateExpression::Not(inner) => 1.0 - inner.estimated_fraction(),
            StateExpression::And(terms) => terms.iter().map(|t| t.estimated_fraction()).product(),
            StateExpression::Or(terms) => {
                1.0 - terms
                    .iter()
                    .map(|t| 1.0 - t.estimated_fraction())
                    .product::<f64>()
            }
        }
    }

    /// True when `self` holding guarantees `other` holds.
    pub fn implies(&self, other: &StateExpression) -> bool {
        other.compare(self) == Truth::True
    }

    pub fn is_tautology(&self) -> bool {
        self.compare(&Self::always()) == Truth::True
    }

    fn precedence(&self) -> u8 {
        match self {
            StateExpression::Or(terms) if terms.len() > 1 => 1,
            StateExpression::And(terms) if terms.len() > 1 => 2,
            _ => 3,
        }
    }

    fn fmt_in(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        let own = self.precedence();
        if own < parent {
            f.write_str("(")?;
        }
        match self {
            StateExpression::State(name) => f.write_str(name)?,
            StateExpression::Not(inner) => {
                f.write_str("!")?;
                inner.fmt_in(f, 3)?;
            }
            StateExpression::And(terms) if terms.is_empty() => f.write_str("true")?,
            StateExpression::Or(terms) if terms.is_empty() => f.write_str("false")?,
            StateExpression::And(terms) | StateExpression::Or(terms) => {
                let sep = if matches!(self, StateExpression::And(_)) { " & " } else { " | " };
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    term.fmt_in(f, own)?;
                }
            }
        }
        if own < parent {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for StateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_in(f, 0)
    }
}

impl FromStr for StateExpression {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self> {
        StateExpression::parse(s)
    }
}

impl Not for StateExpression {
    type Output = StateExpression;

    fn not(self) -> StateExpression {
        match self {
            StateExpression::Not(inner) => *inner,
            other => StateExpression::Not(Box::new(other)),
        }
    }
}

impl BitAnd for StateExpression {
    type Output = StateExpression;

    fn bitand(self, rhs: StateExpression) -> StateExpression {
        let mut terms = match self {
            StateExpression::And(terms) => terms,
            other => vec![other],
        };
        match rhs {
            StateExpression::And(more) => terms.extend(more),
            other => terms.push(other),
        }
        single_or(terms, StateExpression::And)
    }
}

impl BitOr for StateExpression {
    type Output = StateExpression;

    fn bitor(self, rhs: StateExpression) -> StateExpression {
        let mut terms = match self {
            StateExpression::Or(terms) => terms,
            other => vec![other],
        };
        match rhs {
            StateExpression::Or(more) => terms.extend(more),
            other => terms.push(other),
        }
        single_or(terms, StateExpression::Or)
    }
}

/// A lone term stands for itself.
fn single_or(
    mut terms: Vec<StateExpression>,
    join: fn(Vec<StateExpression>) -> StateExpression,
) -> StateExpression {
    match terms.pop() {
        Some(term) if terms.is_empty() => term,
        Some(term) => {
            terms.push(term);
            join(terms)
        }
        None => join(terms),
    }
}
