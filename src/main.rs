// ABOUTME: CLI entry point — no args opens a REPL, one path runs a script, more is a usage error

use clap::Parser as ClapParser;
use miniscript::interpreter::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "miniscript", version, about = "A small, dynamically-typed, C-braced scripting language")]
struct Cli {
    /// Script file to run. With no path, starts an interactive REPL.
    #[arg(num_args = 0..)]
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.paths.as_slice() {
        [] => {
            run_repl();
            ExitCode::SUCCESS
        }
        [path] => {
            if run_file(path) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        _ => {
            eprintln!("Usage: miniscript [script]");
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: &PathBuf) -> bool {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot open file {}: {}", path.display(), e);
            return false;
        }
    };
    tracing::info!(path = %path.display(), "running script");
    let mut interpreter = Interpreter::new(Box::new(miniscript::diagnostics::StdoutSink));
    interpreter.run(&source, Some(path.clone()))
}

fn run_repl() {
    tracing::info!("starting REPL");
    let mut interpreter = Interpreter::new(Box::new(miniscript::diagnostics::StdoutSink));
    let mut editor = DefaultEditor::new().expect("failed to initialize line editor");

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                interpreter.run(&line, None);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {}", e);
                break;
            }
        }
    }
}
