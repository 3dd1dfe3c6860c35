/* A user defined DFA. The transition relation is kept as an append-only table of triples which
 * is scanned in insertion order during simulation and canonicalized only for display. */

use crate::alphabet::Alphabet;
use crate::fa::{Symbol, FA};
use crate::states::StateSet;
use crate::table::{self, RenderOptions, Transition, TransitionRow};
use bitvec::prelude::BitVec;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, trace, warn};

/// Problems found while adding a transition. These are reported back to the caller and never
/// abort anything, the offending transition is simply not added.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Diagnostic {
    /// The token does not name an existing state
    UnknownState(String),
    /// The token is not part of the alphabet
    UnknownSymbol(String),
    /// Every slot of the transition table is used
    TableFull(usize),
    /// A range given for a transition symbol could not be expanded
    RangeNotAccepted(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownState(state) => write!(f, "State '{}' does not exist", state),
            Diagnostic::UnknownSymbol(symbol) => write!(f, "Symbol '{}' does not exist", symbol),
            Diagnostic::TableFull(capacity) => {
                write!(f, "Transition table is full ({} transitions)", capacity)
            }
            Diagnostic::RangeNotAccepted(range) => write!(f, "Range '{}' not accepted", range),
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Verdict {
    Accept,
    Reject,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "Accept"),
            Verdict::Reject => write!(f, "Reject"),
        }
    }
}

/// Why a run was rejected
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Rejection {
    /// The input contains a symbol that is not part of the alphabet
    UnknownSymbol { position: usize, symbol: String },
    /// No transition leaves the current state on the symbol
    Stuck {
        position: usize,
        state: usize,
        symbol: String,
    },
    /// The whole input was consumed but the last state is not final
    NonFinal(usize),
    /// The automaton has no states, so there is no start state
    NoStates,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownSymbol { position, symbol } => write!(
                f,
                "'{}' at position {} is not in the alphabet",
                symbol, position
            ),
            Rejection::Stuck {
                position,
                state,
                symbol,
            } => write!(
                f,
                "no transition from state {} on '{}' at position {}",
                state, symbol, position
            ),
            Rejection::NonFinal(state) => write!(f, "ended in state {} which is not final", state),
            Rejection::NoStates => write!(f, "the automaton has no states"),
        }
    }
}

/// The states visited while running one input
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Trace {
    pub path: Vec<usize>,
    pub rejection: Option<Rejection>,
}

impl Trace {
    pub fn verdict(&self) -> Verdict {
        match self.rejection {
            None => Verdict::Accept,
            Some(_) => Verdict::Reject,
        }
    }
}

/// The rendered transition table. The simplified table is only present when at least one range
/// could be formed, otherwise it would just repeat the full table.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct RenderedTable {
    pub full: Vec<TransitionRow>,
    pub simplified: Option<Vec<TransitionRow>>,
}

#[derive(Debug, Clone)]
pub struct DFA {
    alphabet: BTreeSet<Symbol>,
    states: StateSet,
    transitions: Vec<Transition>,
    capacity: usize,
}

impl FA for DFA {
    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_start_state(&self) -> usize {
        0
    }

    fn get_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        self.states.as_bits()
    }

    fn get_state_transitions(&self, state_id: usize) -> Vec<(&Symbol, &usize)> {
        self.transitions
            .iter()
            .filter(|transition| transition.from == state_id)
            .map(|transition| (&transition.symbol, &transition.to))
            .collect()
    }
}

impl DFA {
    /// Build an automaton over the distinct symbols of the alphabet and a copy of the states.
    /// Transitions are added afterwards with [`DFA::add_transition`].
    pub fn new(alphabet: &Alphabet, states: &StateSet) -> Self {
        let alphabet = alphabet.distinct();
        let capacity = states.len() * alphabet.len();

        debug!(
            "created DFA with {} states, {} symbols and room for {} transitions",
            states.len(),
            alphabet.len(),
            capacity
        );

        DFA {
            alphabet,
            states: states.clone(),
            transitions: Vec::new(),
            capacity,
        }
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    /// Get the transitions in the order they were added
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Maximum number of transitions, the number of states times the number of symbols
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.transitions.len() >= self.capacity
    }

    /// True when the token is an integer naming an existing state
    pub fn is_valid_state(&self, state: &str) -> bool {
        self.states.parse_index(state).is_some()
    }

    pub fn is_valid_symbol(&self, symbol: &str) -> bool {
        self.alphabet.contains(symbol)
    }

    /// Check the source state, symbol and destination state of a transition and add it if all
    /// three are valid. Every invalid part is reported, so up to three diagnostics can come back.
    /// An empty list means the transition was added.
    pub fn add_transition(&mut self, from: &str, symbol: &str, to: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let from_state = self.states.parse_index(from);
        if from_state.is_none() {
            diagnostics.push(Diagnostic::UnknownState(from.to_string()));
        }

        if !self.is_valid_symbol(symbol) {
            diagnostics.push(Diagnostic::UnknownSymbol(symbol.to_string()));
        }

        let to_state = self.states.parse_index(to);
        if to_state.is_none() {
            diagnostics.push(Diagnostic::UnknownState(to.to_string()));
        }

        let (from_state, to_state) = match (from_state, to_state) {
            (Some(from_state), Some(to_state)) if diagnostics.is_empty() => (from_state, to_state),
            _ => {
                debug!("skipped transition {} {} {}", from, symbol, to);
                return diagnostics;
            }
        };

        let transition = Transition::new(from_state, symbol, to_state);
        if self.transitions.contains(&transition) {
            debug!("transition {} is already in the table", transition);
            return diagnostics;
        }

        if self.is_full() {
            diagnostics.push(Diagnostic::TableFull(self.capacity));
            return diagnostics;
        }

        if let Some(existing) = self.next_state(from_state, symbol) {
            if existing != to_state {
                warn!(
                    "state {} already moves to {} on '{}', the transition to {} is never taken",
                    from_state, existing, symbol, to_state
                );
            }
        }

        self.transitions.push(transition);
        diagnostics
    }

    /// Find the first transition added for the state and symbol
    pub fn next_state(&self, state: usize, symbol: &str) -> Option<usize> {
        self.transitions
            .iter()
            .find(|transition| transition.from == state && transition.symbol.as_str() == symbol)
            .map(|transition| transition.to)
    }

    /// Run the input with every character read as one symbol.
    pub fn run(&self, input: &str) -> Verdict {
        self.trace(input).verdict()
    }

    /// Run an explicit sequence of symbols, for alphabets with multi character symbols.
    pub fn run_symbols<I, S>(&self, input: I) -> Verdict
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.trace_symbols(input).verdict()
    }

    pub fn trace(&self, input: &str) -> Trace {
        self.trace_symbols(input.chars().map(String::from))
    }

    /// Simulate the automaton from state 0 and record every state visited. The run stops at the
    /// first symbol outside the alphabet or without a transition.
    pub fn trace_symbols<I, S>(&self, input: I) -> Trace
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.states.is_empty() {
            return Trace {
                path: Vec::new(),
                rejection: Some(Rejection::NoStates),
            };
        }

        let mut state = self.get_start_state();
        let mut path = vec![state];

        for (position, symbol) in input.into_iter().enumerate() {
            let symbol = symbol.as_ref();

            if !self.is_valid_symbol(symbol) {
                trace!("'{}' at {} is not in the alphabet", symbol, position);
                return Trace {
                    path,
                    rejection: Some(Rejection::UnknownSymbol {
                        position,
                        symbol: symbol.to_string(),
                    }),
                };
            }

            state = match self.next_state(state, symbol) {
                Some(next_state) => next_state,
                None => {
                    trace!("stuck in state {} on '{}'", state, symbol);
                    return Trace {
                        path,
                        rejection: Some(Rejection::Stuck {
                            position,
                            state,
                            symbol: symbol.to_string(),
                        }),
                    };
                }
            };

            trace!("'{}' moves to state {}", symbol, state);
            path.push(state);
        }

        let rejection = if self.states.is_final(state) {
            None
        } else {
            Some(Rejection::NonFinal(state))
        };

        Trace { path, rejection }
    }

    /// Run every input up to, but not including, the first one equal to the sentinel.
    pub fn run_batch<I, S>(&self, inputs: I, sentinel: &str) -> Vec<Verdict>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.trace_batch(inputs, sentinel)
            .iter()
            .map(Trace::verdict)
            .collect()
    }

    pub fn trace_batch<I, S>(&self, inputs: I, sentinel: &str) -> Vec<Trace>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inputs
            .into_iter()
            .take_while(|input| input.as_ref() != sentinel)
            .map(|input| self.trace(input.as_ref()))
            .collect()
    }

    /// The deduplicated and sorted transition table
    pub fn canonical_table(&self, options: RenderOptions) -> Vec<Transition> {
        table::canonicalize(&self.transitions, options.state_order)
    }

    /// The canonical table with runs of consecutive digits or letters merged into ranges
    pub fn compressed_table(&self, options: RenderOptions) -> Vec<TransitionRow> {
        table::compress(&self.canonical_table(options))
    }

    /// Render the full table and, when any range could be formed, the simplified table.
    pub fn render(&self, options: RenderOptions) -> RenderedTable {
        let canonical = self.canonical_table(options);
        let compressed = table::compress(&canonical);

        let simplified = if compressed.iter().any(|row| row.symbol.is_range()) {
            Some(compressed)
        } else {
            None
        };

        RenderedTable {
            full: canonical.iter().map(TransitionRow::from).collect(),
            simplified,
        }
    }
}
