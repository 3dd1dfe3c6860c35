use clap::{ArgAction, Parser};
use color_eyre::eyre::Result;
use dfasim::{parse_session_file, read_session, save_graph, RenderOptions, Report, StateOrder};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

#[derive(Parser)]
#[command(
    name = "dfasim",
    version,
    about = "Universal FA: define a deterministic finite automaton, test strings against it and print its transition table"
)]
struct Cli {
    /// Read the session from a file instead of prompting on the terminal
    #[arg(short = 'i', long = "input", value_name = "SESSION FILE")]
    input: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Sort the transition table by state number instead of comparing state numbers as text
    #[arg(short = 'n', long = "numeric-order")]
    numeric_order: bool,

    /// Save the automaton as a Graphviz graph, <STEM>.dot and <STEM>.jpg when Graphviz is installed
    #[arg(short = 'g', long = "save-graph", value_name = "STEM")]
    save_graph: Option<String>,

    /// Log more details to stderr, repeat for more
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(level),
        )
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let session = match &cli.input {
        Some(path) => {
            let session = parse_session_file(path)?;
            for diagnostic in session.diagnostics.iter() {
                eprintln!("{}", diagnostic);
            }
            session
        }
        None => {
            let mut stdout = io::stdout();
            println!("Universal FA");
            read_session(io::stdin().lock(), Some(&mut stdout as &mut dyn Write))?
        }
    };

    let state_order = if cli.numeric_order {
        StateOrder::Numeric
    } else {
        StateOrder::Lexicographic
    };

    let report = Report::from_session(&session, RenderOptions { state_order });

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!();
        println!("{}", report);
    }

    if let Some(stem) = &cli.save_graph {
        save_graph(&session.dfa, stem)?;
    }

    Ok(())
}
