use std::path::PathBuf;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use smart_reporter::common::response::Response;
use smart_reporter::parser::{parse_command, Command};
use smart_reporter::{Config, Error, Session};

#[derive(Parser, Debug)]
#[command(name = "smart_reporter", version, about = "Join, filter and summarize business tables")]
struct Cli {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// REPL history file, overrides the config
    #[arg(long)]
    history: Option<PathBuf>,

    /// Print responses as JSON
    #[arg(long)]
    json: bool,

    /// Log at info level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    /// Files to load before the prompt opens
    #[arg(short, long)]
    load: Vec<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_response(response: &Response, json: bool) {
    if !json {
        println!("{}", response);
        return;
    }
    match response.to_json() {
        Ok(rendered) => println!("{}", rendered),
        Err(err) => println!("Error: {}", err),
    }
}

fn execute(session: &mut Session, line: &str) -> Option<Response> {
    let outcome = parse_command(line).and_then(|command| match command {
        Some(command) => session.handle(command).map(Some),
        None => Ok(None),
    });
    match outcome {
        Ok(response) => response,
        Err(err) => Some(Response::Error(err)),
    }
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(history) = cli.history {
        config.history_file = history;
    }
    let history_file = config.history_file.clone();
    let mut session = Session::new(config);

    for path in cli.load {
        let command = Command::Load {
            path,
            name: None,
            domain: None,
            alias: None,
        };
        match session.handle(command) {
            Ok(response) => print_response(&response, cli.json),
            Err(err) => print_response(&Response::Error(err), cli.json),
        }
    }

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => return Err(Error::IOError(std::io::Error::other(err.to_string()))),
    };

    #[cfg(feature = "with-file-history")]
    if editor.load_history(&history_file).is_err() {
        println!("No history file...");
    }

    let mut statement = String::new();
    loop {
        let prompt = if statement.is_empty() { ">>> " } else { "..> " };
        match editor.readline(prompt) {
            Ok(line) => {
                statement.push_str(&line);
                if statement.ends_with('\\') {
                    statement.pop();
                    statement.push(' ');
                    continue;
                }
                if let Err(err) = editor.add_history_entry(statement.as_str()) {
                    warn!(%err, "could not record history entry");
                }
                let response = execute(&mut session, &statement);
                // Once we reach the end of a statement, clean house
                statement.clear();
                if let Some(response) = response {
                    print_response(&response, cli.json);
                    if matches!(response, Response::Quit) {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                error!(%err, "readline failed");
                break;
            }
        }
    }

    #[cfg(feature = "with-file-history")]
    if let Err(err) = editor.save_history(&history_file) {
        warn!(%err, path = %history_file.display(), "could not save history");
    }

    Ok(())
}
