use bitvec::prelude::BitVec;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A single alphabet symbol. Symbols are opaque strings and compare by exact match, so a symbol
/// can be one character or a longer literal such as `if`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

/// The character classes inside which transition symbols can be merged into ranges.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SymbolClass {
    Digit,
    Lower,
    Upper,
}

impl SymbolClass {
    pub fn of(ch: char) -> Option<Self> {
        match ch {
            '0'..='9' => Some(SymbolClass::Digit),
            'a'..='z' => Some(SymbolClass::Lower),
            'A'..='Z' => Some(SymbolClass::Upper),
            _ => None,
        }
    }
}

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Symbol(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the character of a one character ASCII alphanumeric symbol. Every other symbol,
    /// including multi character literals, has no range character and is never compressed.
    pub fn range_char(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if SymbolClass::of(ch).is_some() => Some(ch),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(symbol: &str) -> Self {
        Symbol::new(symbol)
    }
}

impl From<String> for Symbol {
    fn from(symbol: String) -> Self {
        Symbol(symbol)
    }
}

impl From<char> for Symbol {
    fn from(ch: char) -> Self {
        Symbol(ch.to_string())
    }
}

impl std::borrow::Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

pub trait FA {
    fn get_num_states(&self) -> usize;
    fn get_start_state(&self) -> usize;
    fn get_alphabet(&self) -> &BTreeSet<Symbol>;
    fn get_acceptor_states(&self) -> &BitVec<u8>;
    fn get_state_transitions(&self, state_id: usize) -> Vec<(&Symbol, &usize)>;
}
