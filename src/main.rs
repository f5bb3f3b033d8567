// startlang: Start/end parser with a step-by-step parse viewer

mod cli;

use std::fs;
use std::io::{self, Read};

use clap::Parser as _;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use startlang::parser::ast::Program;
use startlang::parser::diagnostics::Diagnostic;
use startlang::parser::grammar::Grammar;
use startlang::parser::lexer::Lexer;
use startlang::parser::parse::{Parser, ParserConfig};
use startlang::trace::{TraceRecorder, TraceStep};
use startlang::ui::App;

use cli::{Cli, Emit};

/// Upper bound on recorded steps for `--emit trace` and the viewer
const TRACE_LIMIT: usize = 100_000;

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("startlang=warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let (source, file_name) = match &cli.file {
        Some(path) => (fs::read_to_string(path)?, path.display().to_string()),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            (buffer, String::from("<stdin>"))
        }
    };

    let loaded;
    let grammar: &Grammar = match &cli.grammar {
        Some(path) => {
            loaded = Grammar::from_json(&fs::read_to_string(path)?)?;
            info!(path = %path.display(), "loaded production table");
            &loaded
        }
        None => Grammar::standard()?,
    };

    if cli.emit == Emit::Grammar {
        println!("{}", serde_json::to_string_pretty(&grammar.to_records())?);
        return Ok(());
    }

    let tokens = Lexer::new(&source).tokenize();
    if cli.emit == Emit::Tokens {
        for token in &tokens {
            println!(
                "{:>4}:{:<4} {:<16} {}",
                token.location.line,
                token.location.column,
                token.symbol.name(),
                token
            );
        }
        return Ok(());
    }

    let mut parser = Parser::new(grammar, tokens).with_config(ParserConfig {
        max_depth: cli.max_depth,
    });
    if cli.tui || cli.emit == Emit::Trace {
        parser = parser.with_trace(TraceRecorder::new(TRACE_LIMIT));
    }

    let outcome = parser.parse();
    let recorder = parser.take_trace();
    let truncated_at = recorder
        .as_ref()
        .filter(|recorder| recorder.is_truncated())
        .map(TraceRecorder::step_limit);
    let steps: Vec<TraceStep> = recorder
        .map(|recorder| recorder.steps().to_vec())
        .unwrap_or_default();

    if cli.tui {
        return run_viewer(source, steps, outcome);
    }

    match outcome {
        Ok(program) => {
            match cli.emit {
                Emit::Json => println!("{}", serde_json::to_string_pretty(&program)?),
                Emit::Trace => print_trace(&steps, truncated_at),
                _ => {
                    for line in program.outline() {
                        println!("{}", line);
                    }
                }
            }
            Ok(())
        }
        Err(diagnostics) => {
            if cli.emit == Emit::Trace {
                print_trace(&steps, truncated_at);
            }
            report(&diagnostics, &source, &file_name);
            std::process::exit(1);
        }
    }
}

fn print_trace(steps: &[TraceStep], truncated_at: Option<usize>) {
    for (index, step) in steps.iter().enumerate() {
        let stack: Vec<&str> = step.stack.iter().map(|s| s.name()).collect();
        println!("{:>5}  {:<64} [{}]", index, step.action, stack.join(" "));
    }
    if let Some(limit) = truncated_at {
        println!("  ...  trace stopped at {} steps", limit);
    }
}

fn report(diagnostics: &[Diagnostic], source: &str, file_name: &str) {
    for diagnostic in diagnostics {
        debug!(kind = diagnostic.kind.code(), "{}", diagnostic);
        eprintln!("{}", diagnostic.render(source, file_name));
    }
}

fn run_viewer(
    source: String,
    steps: Vec<TraceStep>,
    outcome: Result<Program, Vec<Diagnostic>>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, steps, outcome);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
