use crate::fa::Symbol;
use std::collections::BTreeSet;

/// The symbols entered for an automaton, in the order they were entered. Repeated symbols are
/// kept here and only folded together by [`Alphabet::distinct`].
#[derive(Debug, Clone, Default)]
pub struct Alphabet {
    symbols: Vec<Symbol>,
}

impl Alphabet {
    pub fn new(capacity_hint: usize) -> Self {
        Alphabet {
            symbols: Vec::with_capacity(capacity_hint),
        }
    }

    /// Append a symbol to the alphabet.
    pub fn add(&mut self, symbol: impl Into<Symbol>) {
        if self.symbols.len() == self.symbols.capacity() {
            // Alphabets are small, grow one slot at a time
            self.symbols.reserve_exact(1);
        }
        self.symbols.push(symbol.into());
    }

    /// Number of symbols added, repeats included
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Get the deduplicated alphabet in lexicographic order
    pub fn distinct(&self) -> BTreeSet<Symbol> {
        self.symbols.iter().cloned().collect()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for Alphabet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut alphabet = Alphabet::new(0);
        for symbol in iter {
            alphabet.add(symbol);
        }
        alphabet
    }
}
