use crate::dfa::{Diagnostic, RenderedTable, Verdict, DFA};
use crate::fa::{Symbol, FA};
use crate::session::{Session, SENTINEL};
use crate::table::{RenderOptions, TransitionRow};
use serde::Serialize;
use std::fmt;

/// The verdict for one test string
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct TestResult {
    pub input: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Summary of a session: the automaton, its rendered transition table and the test results.
/// Printing a report gives the console layout, serializing it gives the same data as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub num_states: usize,
    pub final_states: Vec<usize>,
    pub alphabet: Vec<Symbol>,
    pub transitions: RenderedTable,
    pub results: Vec<TestResult>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(dfa: &DFA, test_strings: &[String], options: RenderOptions) -> Self {
        let traces = dfa.trace_batch(test_strings, SENTINEL);

        let results = test_strings
            .iter()
            .zip(traces)
            .map(|(input, trace)| TestResult {
                input: input.clone(),
                verdict: trace.verdict(),
                reason: trace.rejection.as_ref().map(|rejection| rejection.to_string()),
            })
            .collect();

        Report {
            num_states: dfa.get_num_states(),
            final_states: dfa.states().final_states(),
            alphabet: dfa.get_alphabet().iter().cloned().collect(),
            transitions: dfa.render(options),
            results,
            diagnostics: Vec::new(),
        }
    }

    pub fn from_session(session: &Session, options: RenderOptions) -> Self {
        let mut report = Report::new(&session.dfa, &session.test_strings, options);
        report.diagnostics = session.diagnostics.clone();
        report
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[TransitionRow]) -> fmt::Result {
    if rows.is_empty() {
        return writeln!(f, "\tNo transitions");
    }
    for row in rows {
        writeln!(f, "\t{} {} {} ", row.from, row.symbol, row.to)?;
    }
    Ok(())
}

// Pad the input so the verdicts line up in a column
fn write_result(f: &mut fmt::Formatter<'_>, result: &TestResult) -> fmt::Result {
    let length = result.input.chars().count();
    let input = if length == 0 {
        "(empty)"
    } else {
        result.input.as_str()
    };
    let padding = if length >= 16 {
        "\t"
    } else if length >= 8 {
        "\t\t"
    } else {
        "\t\t\t"
    };
    writeln!(f, "\t{}{}{}", input, padding, result.verdict)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "number of states: {}", self.num_states)?;

        if self.final_states.is_empty() {
            writeln!(f, "final states: none")?;
        } else {
            writeln!(f, "final states: {}", join(&self.final_states))?;
        }

        writeln!(f, "alphabet: {}", join(&self.alphabet))?;

        writeln!(f, "transitions: ")?;
        match &self.transitions.simplified {
            None => write_rows(f, &self.transitions.full)?,
            Some(simplified) => {
                writeln!(f, "Full Table")?;
                write_rows(f, &self.transitions.full)?;
                writeln!(f, "Simplified Table")?;
                write_rows(f, simplified)?;
            }
        }

        writeln!(f, "strings: ")?;
        if self.results.is_empty() {
            writeln!(f, "\tNo strings to test")?;
        }
        for result in self.results.iter() {
            write_result(f, result)?;
        }

        writeln!(f)?;
        write!(f, "{}", SENTINEL)
    }
}
