//! # dfasim
//!
//! A simulator for deterministic finite automata, meant for exploring automata theory.
//!
//! This library provides functionality to:
//! - Define a DFA from a set of states, an alphabet and a list of transitions
//! - Validate transitions and report every invalid state or symbol
//! - Run test strings against the DFA and accept or reject them
//! - Render the transition table, merging runs of digits or letters into ranges
//! - Read a complete session in the line based format used by the command line tool
//! - Export the automaton as a Graphviz graph

// Re-export the modules
pub mod alphabet;
pub mod dfa;
pub mod fa;
pub mod report;
pub mod session;
pub mod states;
pub mod table;
pub mod visualizer;

// Re-export commonly used types for convenience
pub use alphabet::Alphabet;
pub use dfa::{Diagnostic, Verdict, DFA};
pub use report::Report;
pub use session::{parse_session, parse_session_file, read_session};
pub use states::StateSet;
pub use table::{RenderOptions, StateOrder};
pub use visualizer::{save_graph, to_dot};
