/* Canonical and range compressed views of a transition table. The canonical view drops repeated
 * triples and sorts the rest, the compressed view then merges runs of consecutive digits or
 * letters leading from the same state to the same state into a single range row. */

use crate::fa::{Symbol, SymbolClass};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A single `(from, symbol, to)` entry of the transition table
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize)]
pub struct Transition {
    pub from: usize,
    pub symbol: Symbol,
    pub to: usize,
}

impl Transition {
    pub fn new(from: usize, symbol: impl Into<Symbol>, to: usize) -> Self {
        Transition {
            from,
            symbol: symbol.into(),
            to,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.symbol, self.to)
    }
}

/// How state indices are compared when sorting the canonical table
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum StateOrder {
    /// Compare the decimal strings, so state 10 sorts before state 2
    #[default]
    Lexicographic,
    Numeric,
}

impl StateOrder {
    fn compare(&self, a: usize, b: usize) -> Ordering {
        match self {
            StateOrder::Lexicographic => a.to_string().cmp(&b.to_string()),
            StateOrder::Numeric => a.cmp(&b),
        }
    }
}

/// Options which control how a transition table is rendered
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderOptions {
    pub state_order: StateOrder,
}

/// The symbol column of a rendered row, either one symbol or an inclusive range of characters
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SymbolSpan {
    Single(Symbol),
    Range(char, char),
}

impl SymbolSpan {
    pub fn is_range(&self) -> bool {
        matches!(self, SymbolSpan::Range(_, _))
    }

    /// List every symbol covered by the span
    pub fn symbols(&self) -> Vec<Symbol> {
        match self {
            SymbolSpan::Single(symbol) => vec![symbol.clone()],
            SymbolSpan::Range(first, last) => (*first..=*last).map(Symbol::from).collect(),
        }
    }
}

impl fmt::Display for SymbolSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolSpan::Single(symbol) => write!(f, "{}", symbol),
            SymbolSpan::Range(first, last) => write!(f, "{}-{}", first, last),
        }
    }
}

impl Serialize for SymbolSpan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A row of a rendered transition table
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct TransitionRow {
    pub from: usize,
    pub symbol: SymbolSpan,
    pub to: usize,
}

impl TransitionRow {
    /// Expand the row back into the transitions it stands for
    pub fn expand(&self) -> Vec<Transition> {
        self.symbol
            .symbols()
            .into_iter()
            .map(|symbol| Transition::new(self.from, symbol, self.to))
            .collect()
    }
}

impl From<&Transition> for TransitionRow {
    fn from(transition: &Transition) -> Self {
        TransitionRow {
            from: transition.from,
            symbol: SymbolSpan::Single(transition.symbol.clone()),
            to: transition.to,
        }
    }
}

impl fmt::Display for TransitionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.symbol, self.to)
    }
}

/// Remove repeated transitions and sort by source state, then symbol, then destination state.
pub fn canonicalize(transitions: &[Transition], order: StateOrder) -> Vec<Transition> {
    let mut table = transitions.to_vec();

    table.sort_by(|a, b| {
        order
            .compare(a.from, b.from)
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| order.compare(a.to, b.to))
    });

    // Equal triples are adjacent after sorting
    table.dedup();
    table
}

// `next` continues the run ending in `last` when both share a class and `next` follows `last`
fn extends_run(last: char, next: char) -> bool {
    SymbolClass::of(last).is_some()
        && SymbolClass::of(last) == SymbolClass::of(next)
        && (last as u32) + 1 == next as u32
}

/// Merge runs of consecutive digits or letters that share the source and destination state.
/// The table is expected in canonical order, see [`canonicalize`].
pub fn compress(canonical: &[Transition]) -> Vec<TransitionRow> {
    let mut rows: Vec<TransitionRow> = Vec::new();
    let mut idx = 0;

    while idx < canonical.len() {
        let head = &canonical[idx];

        let first = match head.symbol.range_char() {
            None => {
                rows.push(TransitionRow::from(head));
                idx += 1;
                continue;
            }
            Some(ch) => ch,
        };

        let mut last = first;
        let mut next_idx = idx + 1;

        while let Some(next) = canonical.get(next_idx) {
            if next.from != head.from || next.to != head.to {
                break;
            }
            match next.symbol.range_char() {
                Some(ch) if extends_run(last, ch) => {
                    last = ch;
                    next_idx += 1;
                }
                _ => break,
            }
        }

        let symbol = if first == last {
            SymbolSpan::Single(head.symbol.clone())
        } else {
            SymbolSpan::Range(first, last)
        };

        rows.push(TransitionRow {
            from: head.from,
            symbol,
            to: head.to,
        });
        idx = next_idx;
    }

    rows
}
