/* Reader for the line based session format. A session lists the number of states, the final
 * states, the alphabet, the transitions and finally the strings to test, one item per line:
 *
 *     3
 *     2
 *     a-c, numbers
 *     (0 a-c 1)
 *     1 numbers 2
 *     a7
 *     .....
 */

use crate::alphabet::Alphabet;
use crate::dfa::{Diagnostic, DFA};
use crate::states::StateSet;
use color_eyre::eyre::{Report, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info};

/// Ends the list of test strings
pub const SENTINEL: &str = ".....";

/// Most test strings read in one session
pub const MAX_TEST_STRINGS: usize = 20;

const STATES_PROMPT: &str = "Enter number of states:";
const FINALS_PROMPT: &str = "Enter final states:";
const ALPHABET_PROMPT: &str =
    "Enter alphabet (may include 'letters', 'numbers', and/or ranges i.e. '2-7', 'a-z', 'G-M'):";
const TRANSITIONS_PROMPT: &str = "Enter transitions in the format 'p a q' first (may also put 'letters', 'numbers', or ranges for the symbol)\nThen up to 20 test strings (enter '.....' to finish): ";
const TABLE_FULL_PROMPT: &str = "Enter test strings:";
const TEST_STRING_PROMPT: &str =
    "Read as a test string, enter up to 19 test strings, ('.....' to finish): ";

/// Errors which make it impossible to build an automaton from the session
#[derive(Debug)]
pub enum SessionError {
    /// The input ended before the number of states was given
    MissingStateCount,
    /// The number of states is not a non-negative integer
    InvalidStateCount(String),
    FileOpenError(String),
    FileReadError(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::MissingStateCount => {
                write!(f, "Error: The number of states was not provided!")
            }
            SessionError::InvalidStateCount(count) => write!(
                f,
                "Error: You must enter an integer for the number of states, found '{}'",
                count
            ),
            SessionError::FileOpenError(err_line) => write!(f, "{}", err_line),
            SessionError::FileReadError(err_line) => write!(f, "{}", err_line),
        }
    }
}

impl std::error::Error for SessionError {}

/// Everything read from one session
#[derive(Debug)]
pub struct Session {
    pub dfa: DFA,
    pub test_strings: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// How a symbol token of the alphabet or of a transition is to be read
#[derive(Debug, PartialEq, Eq)]
enum SymbolPattern {
    Letters,
    Numbers,
    Range(char, char),
    InvalidRange(String),
    Literal(String),
}

impl SymbolPattern {
    fn parse(token: &str) -> Self {
        match token {
            "letters" => return SymbolPattern::Letters,
            "numbers" => return SymbolPattern::Numbers,
            _ => {}
        }

        // A range needs something on both sides of the hyphen, so "-" and "->" stay literals
        let is_range = token
            .char_indices()
            .any(|(idx, ch)| ch == '-' && idx > 0 && idx + 1 < token.len());

        if !is_range {
            return SymbolPattern::Literal(token.to_string());
        }

        let range = token
            .split_once('-')
            .and_then(|(start, end)| Some((single_char(start)?, single_char(end)?)))
            .filter(|(start, end)| {
                start.is_ascii_digit() && end.is_ascii_digit()
                    || start.is_ascii_lowercase() && end.is_ascii_lowercase()
                    || start.is_ascii_uppercase() && end.is_ascii_uppercase()
            });

        match range {
            Some((start, end)) => SymbolPattern::Range(start, end),
            None => SymbolPattern::InvalidRange(token.to_string()),
        }
    }

    /// The symbols the token stands for, None for an invalid range
    fn symbols(&self) -> Option<Vec<String>> {
        match self {
            SymbolPattern::Letters => Some(
                ('a'..='z')
                    .flat_map(|ch| [ch, ch.to_ascii_uppercase()])
                    .map(String::from)
                    .collect(),
            ),
            SymbolPattern::Numbers => Some(('0'..='9').map(String::from).collect()),
            SymbolPattern::Range(start, end) => Some((*start..=*end).map(String::from).collect()),
            SymbolPattern::InvalidRange(_) => None,
            SymbolPattern::Literal(symbol) => Some(vec![symbol.clone()]),
        }
    }
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

// Commas and any amount of whitespace separate the items of a list
fn split_list(line: &str) -> impl Iterator<Item = &str> {
    line.split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
}

// Returns the (from, symbol, to) fields when the line is written as a transition
fn transition_fields(line: &str) -> Option<(&str, &str, &str)> {
    let line = line.trim();
    let line = line
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(line);

    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(from), Some(symbol), Some(to)) => Some((from, symbol, to)),
        _ => None,
    }
}

fn normalize_test_string(line: &str) -> String {
    line.chars().filter(|ch| !ch.is_whitespace()).collect()
}

struct LineReader<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = match self.reader.read_line(&mut line) {
            Ok(bytes_read) => bytes_read,
            Err(error) => {
                let err_line = format!(
                    "Error: Failed to read line number {} of the session {}",
                    self.line_number + 1,
                    error
                );
                return Err(Report::new(SessionError::FileReadError(err_line)));
            }
        };

        if bytes_read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        let trimmed_len = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

struct SessionReader<'a, R> {
    lines: LineReader<R>,
    prompt: Option<&'a mut dyn Write>,
    diagnostics: Vec<Diagnostic>,
}

impl<R: BufRead> SessionReader<'_, R> {
    fn say(&mut self, message: &str) -> Result<()> {
        if let Some(prompt) = self.prompt.as_mut() {
            writeln!(prompt, "{}", message)?;
            prompt.flush()?;
        }
        Ok(())
    }

    fn report(&mut self, diagnostics: Vec<Diagnostic>) -> Result<()> {
        for diagnostic in diagnostics {
            self.say(&diagnostic.to_string())?;
            self.diagnostics.push(diagnostic);
        }
        Ok(())
    }

    fn read_state_count(&mut self) -> Result<StateSet> {
        self.say(STATES_PROMPT)?;

        loop {
            let line = match self.lines.next_line()? {
                None => return Err(Report::new(SessionError::MissingStateCount)),
                Some(line) => line,
            };

            let count = match line.split_whitespace().next() {
                None => continue,
                Some(count) => count,
            };

            return match count.parse::<usize>() {
                Ok(count) => Ok(StateSet::new(count)),
                Err(_) => Err(Report::new(SessionError::InvalidStateCount(
                    count.to_string(),
                ))),
            };
        }
    }

    fn read_final_states(&mut self, states: &mut StateSet) -> Result<()> {
        self.say(FINALS_PROMPT)?;

        let line = self.lines.next_line()?.unwrap_or_default();
        let mut diagnostics = Vec::new();

        for token in split_list(&line) {
            match states.parse_index(token) {
                Some(index) => states.mark_final(index),
                None => diagnostics.push(Diagnostic::UnknownState(token.to_string())),
            }
        }

        self.report(diagnostics)
    }

    fn read_alphabet(&mut self) -> Result<Alphabet> {
        self.say(ALPHABET_PROMPT)?;

        let line = self.lines.next_line()?.unwrap_or_default();
        let tokens: Vec<&str> = split_list(&line).collect();
        let mut alphabet = Alphabet::new(tokens.len());

        for token in tokens {
            match SymbolPattern::parse(token).symbols() {
                Some(symbols) => symbols.into_iter().for_each(|symbol| alphabet.add(symbol)),
                None => debug!("ignoring alphabet range {}", token),
            }
        }

        Ok(alphabet)
    }

    /// Add transitions until a line that is not a transition shows up or the table is full.
    /// Returns the line which ended the transitions, if it still has to be read as a test string.
    fn read_transitions(&mut self, dfa: &mut DFA) -> Result<Option<String>> {
        self.say(TRANSITIONS_PROMPT)?;

        while let Some(line) = self.lines.next_line()? {
            let (from, symbol, to) = match transition_fields(&line) {
                None => return Ok(Some(line)),
                Some(fields) => fields,
            };

            let pattern = SymbolPattern::parse(symbol);
            let symbols = match pattern.symbols() {
                Some(symbols) => symbols,
                None => {
                    self.report(vec![Diagnostic::RangeNotAccepted(symbol.to_string())])?;
                    continue;
                }
            };

            for symbol in symbols {
                let diagnostics = dfa.add_transition(from, &symbol, to);
                self.report(diagnostics)?;

                if dfa.is_full() {
                    info!("transition table is full after {} transitions", dfa.num_transitions());
                    self.say(TABLE_FULL_PROMPT)?;
                    return Ok(None);
                }
            }
        }

        Ok(None)
    }

    fn read_test_strings(&mut self, first: Option<String>) -> Result<Vec<String>> {
        let mut test_strings = Vec::new();

        if let Some(first) = first {
            let first = normalize_test_string(&first);
            if first == SENTINEL {
                return Ok(test_strings);
            }
            self.say(TEST_STRING_PROMPT)?;
            test_strings.push(first);
        }

        while test_strings.len() < MAX_TEST_STRINGS {
            let line = match self.lines.next_line()? {
                None => break,
                Some(line) => normalize_test_string(&line),
            };

            if line == SENTINEL {
                break;
            }
            test_strings.push(line);
        }

        Ok(test_strings)
    }
}

/// Read a whole session. When a prompt writer is given, the prompts and the diagnostics are
/// written to it as the session is read, the way an interactive user expects to see them.
pub fn read_session<R: BufRead>(reader: R, prompt: Option<&mut dyn Write>) -> Result<Session> {
    let mut session_reader = SessionReader {
        lines: LineReader {
            reader,
            line_number: 0,
        },
        prompt,
        diagnostics: Vec::new(),
    };

    let mut states = session_reader.read_state_count()?;
    session_reader.read_final_states(&mut states)?;
    let alphabet = session_reader.read_alphabet()?;

    let mut dfa = DFA::new(&alphabet, &states);

    let pending = session_reader.read_transitions(&mut dfa)?;
    let test_strings = session_reader.read_test_strings(pending)?;

    debug!(
        "read session with {} transitions and {} test strings",
        dfa.num_transitions(),
        test_strings.len()
    );

    Ok(Session {
        dfa,
        test_strings,
        diagnostics: session_reader.diagnostics,
    })
}

/// Read a session from a string, without prompts
pub fn parse_session(text: &str) -> Result<Session> {
    read_session(text.as_bytes(), None)
}

/// Read a session from a file, without prompts
pub fn parse_session_file<P: AsRef<Path>>(file_path: P) -> Result<Session> {
    let file_path = file_path.as_ref();
    let file = match File::open(file_path) {
        Ok(file) => file,
        Err(error) => {
            let err_line = format!(
                "Error: Failed to open the session file {} {}",
                file_path.display(),
                error
            );
            return Err(Report::new(SessionError::FileOpenError(err_line)));
        }
    };

    read_session(BufReader::new(file), None)
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::dfa::Verdict;
    use crate::fa::FA;

    #[test]
    fn test_symbol_pattern() {
        assert_eq!(SymbolPattern::parse("letters"), SymbolPattern::Letters);
        assert_eq!(SymbolPattern::parse("numbers"), SymbolPattern::Numbers);
        assert_eq!(SymbolPattern::parse("a-z"), SymbolPattern::Range('a', 'z'));
        assert_eq!(SymbolPattern::parse("2-7"), SymbolPattern::Range('2', '7'));
        assert_eq!(SymbolPattern::parse("G-M"), SymbolPattern::Range('G', 'M'));
        assert_eq!(
            SymbolPattern::parse("a-Z"),
            SymbolPattern::InvalidRange("a-Z".to_string())
        );
        assert_eq!(
            SymbolPattern::parse("1-b"),
            SymbolPattern::InvalidRange("1-b".to_string())
        );
        assert_eq!(
            SymbolPattern::parse("ab-c"),
            SymbolPattern::InvalidRange("ab-c".to_string())
        );
        assert_eq!(SymbolPattern::parse("-"), SymbolPattern::Literal("-".to_string()));
        assert_eq!(SymbolPattern::parse("->"), SymbolPattern::Literal("->".to_string()));
        assert_eq!(SymbolPattern::parse("a-"), SymbolPattern::Literal("a-".to_string()));
        assert_eq!(SymbolPattern::parse("if"), SymbolPattern::Literal("if".to_string()));
    }

    #[test]
    fn test_symbol_pattern_expansion() {
        let letters = SymbolPattern::Letters.symbols().unwrap();
        assert_eq!(letters.len(), 52);
        assert_eq!(&letters[..4], &["a", "A", "b", "B"]);

        let numbers = SymbolPattern::Numbers.symbols().unwrap();
        assert_eq!(numbers.first().map(String::as_str), Some("0"));
        assert_eq!(numbers.last().map(String::as_str), Some("9"));

        assert_eq!(
            SymbolPattern::Range('x', 'z').symbols().unwrap(),
            vec!["x", "y", "z"]
        );
        assert!(SymbolPattern::Range('z', 'x').symbols().unwrap().is_empty());
        assert!(SymbolPattern::InvalidRange("+-+".to_string()).symbols().is_none());
    }

    #[test]
    fn test_transition_fields() {
        assert_eq!(transition_fields("0 a 1"), Some(("0", "a", "1")));
        assert_eq!(transition_fields("(0 a 1)"), Some(("0", "a", "1")));
        assert_eq!(transition_fields("  0   a-c  1 "), Some(("0", "a-c", "1")));
        assert_eq!(transition_fields("0 a 1 extra"), Some(("0", "a", "1")));
        assert_eq!(transition_fields("ab"), None);
        assert_eq!(transition_fields("a b"), None);
        assert_eq!(transition_fields(""), None);
        assert_eq!(transition_fields("....."), None);
    }

    #[test]
    fn test_split_list() {
        let tokens: Vec<&str> = split_list("0, 1 ,2,,  3").collect();
        assert_eq!(tokens, vec!["0", "1", "2", "3"]);
        assert_eq!(split_list("").count(), 0);
    }

    #[test]
    fn test_read_basic_session() {
        let session = parse_session("2\n1\na b\n0 a 1\n0 b 1\n1 a 1\n1 b 1\na\n\nba\nc\n.....\n")
            .unwrap();

        assert!(session.diagnostics.is_empty());
        assert_eq!(session.dfa.get_num_states(), 2);
        assert_eq!(session.dfa.num_transitions(), 4);
        // The table filled up with the last transition, so every line after it is a test string
        assert_eq!(session.test_strings, vec!["a", "", "ba", "c"]);

        let verdicts = session.dfa.run_batch(&session.test_strings, SENTINEL);
        assert_eq!(
            verdicts,
            vec![
                Verdict::Accept,
                Verdict::Reject,
                Verdict::Accept,
                Verdict::Reject
            ]
        );
    }

    #[test]
    fn test_first_non_transition_line_is_a_test_string() {
        let session = parse_session("2\n1\na, b\n(0 a 1)\na a\nab\n.....\n").unwrap();
        assert_eq!(session.dfa.num_transitions(), 1);
        assert_eq!(session.test_strings, vec!["aa", "ab"]);
    }

    #[test]
    fn test_keywords_and_ranges_in_transitions() {
        let session = parse_session("3\n2\nletters numbers\n0 letters 1\n1 0-4 2\n.....\n").unwrap();
        assert!(session.diagnostics.is_empty());
        assert_eq!(session.dfa.num_transitions(), 52 + 5);
        assert!(session.test_strings.is_empty());
        assert_eq!(session.dfa.run("Q3"), Verdict::Accept);
        assert_eq!(session.dfa.run("q7"), Verdict::Reject);
    }

    #[test]
    fn test_invalid_ranges() {
        let session = parse_session("2\n\na-c 3-1 a-Z x\n0 a-Z 1\n0 x 1\n.....\n").unwrap();

        let alphabet: Vec<&str> = session
            .dfa
            .get_alphabet()
            .iter()
            .map(|symbol| symbol.as_str())
            .collect();
        assert_eq!(alphabet, vec!["a", "b", "c", "x"]);
        assert_eq!(
            session.diagnostics,
            vec![Diagnostic::RangeNotAccepted("a-Z".to_string())]
        );
        assert_eq!(session.dfa.num_transitions(), 1);
    }

    #[test]
    fn test_final_state_diagnostics() {
        let session = parse_session("2\n1, 5 x\na\n.....\n").unwrap();
        assert_eq!(session.dfa.states().final_states(), vec![1]);
        assert_eq!(
            session.diagnostics,
            vec![
                Diagnostic::UnknownState("5".to_string()),
                Diagnostic::UnknownState("x".to_string())
            ]
        );
    }

    #[test]
    fn test_transition_diagnostics_are_collected() {
        let session = parse_session("2\n1\na\n0 b 2\n0 a 1\n.....\n").unwrap();
        assert_eq!(
            session.diagnostics,
            vec![
                Diagnostic::UnknownSymbol("b".to_string()),
                Diagnostic::UnknownState("2".to_string())
            ]
        );
        assert_eq!(session.dfa.num_transitions(), 1);
    }

    #[test]
    fn test_table_full_stops_transitions() {
        // One state and two symbols leave room for two transitions
        let session = parse_session("1\n0\na b\n0 a-b 0\n0 a 0\n.....\n").unwrap();
        assert_eq!(session.dfa.num_transitions(), 2);
        assert_eq!(session.test_strings, vec!["0a0"]);
    }

    #[test]
    fn test_test_string_limit() {
        let mut text = String::from("1\n0\na\n");
        for _ in 0..25 {
            text.push_str("a\n");
        }
        let session = parse_session(&text).unwrap();
        assert_eq!(session.test_strings.len(), MAX_TEST_STRINGS);
    }

    #[test]
    fn test_spaces_are_removed_from_test_strings() {
        let session = parse_session("1\n0\na\nq\n a a \n.....\n").unwrap();
        assert_eq!(session.test_strings, vec!["q", "aa"]);
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let session = parse_session("2\n1\na\n0 a 1").unwrap();
        assert_eq!(session.dfa.num_transitions(), 1);
        assert!(session.test_strings.is_empty());

        let session = parse_session("3\n").unwrap();
        assert_eq!(session.dfa.get_num_states(), 3);
        assert!(session.dfa.get_alphabet().is_empty());
    }

    #[test]
    fn test_state_count_errors() {
        let err = parse_session("three\n").unwrap_err();
        match err.downcast_ref() {
            Some(SessionError::InvalidStateCount(count)) => assert_eq!(count, "three"),
            _ => unreachable!(),
        }

        let err = parse_session("-2\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref(),
            Some(SessionError::InvalidStateCount(_))
        ));

        let err = parse_session("\n\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref(),
            Some(SessionError::MissingStateCount)
        ));
    }

    #[test]
    fn test_prompts_and_diagnostics_are_echoed() {
        let mut output: Vec<u8> = Vec::new();
        let session = read_session(
            "1\n4\na\n0 b 0\n0 a 0\n.....\n".as_bytes(),
            Some(&mut output as &mut dyn Write),
        )
        .unwrap();
        assert_eq!(session.dfa.num_transitions(), 1);

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with(STATES_PROMPT));
        assert!(output.contains("State '4' does not exist"));
        assert!(output.contains("Symbol 'b' does not exist"));
        assert!(output.contains(TABLE_FULL_PROMPT));
    }

    #[test]
    fn test_repeated_transition_line_does_not_fill_the_table() {
        let session = parse_session("1\n0\na b\n0 a 0\n0 a 0\n0 b 0\nb\n.....\n").unwrap();

        assert!(session.diagnostics.is_empty());
        assert_eq!(session.dfa.num_transitions(), 2);
        assert_eq!(session.test_strings, vec!["b"]);
        assert_eq!(session.dfa.run("b"), Verdict::Accept);
    }

    #[test]
    fn test_missing_session_file() {
        let err = parse_session_file("test_data/does_not_exist.dfa").unwrap_err();
        assert!(matches!(
            err.downcast_ref(),
            Some(SessionError::FileOpenError(_))
        ));
    }
}
