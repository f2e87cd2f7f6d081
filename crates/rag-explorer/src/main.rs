//! A simple terminal client for a document-question-answering backend.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rag_explorer::backend::{Document, SUPPORTED_EXTENSIONS};
use rag_explorer::core::conversation::{
    ConversationState, EMPTY_TRANSCRIPT_HINTS, Role, Turn,
};
use rag_explorer::core::{SubmissionOutcome, UploadError};
use rag_explorer::http::{HttpBackend, HttpBackendConfigBuilder};
use rag_explorer::{Session, SessionBuilder};
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

enum Command<'a> {
    Ask(&'a str),
    Upload(&'a str),
    Clear,
    Quit,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some(("/upload", path)) => Command::Upload(path.trim()),
            _ if line == "/upload" => Command::Upload(""),
            _ if line == "/clear" => Command::Clear,
            _ if line == "/quit" => Command::Quit,
            _ => Command::Ask(line),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config_builder = HttpBackendConfigBuilder::new();
    if let Ok(base_url) = env::var("RAG_EXPLORER_API_BASE_URL") {
        config_builder = config_builder.with_base_url(base_url);
    }
    if let Ok(top_k) = env::var("RAG_EXPLORER_TOP_K") {
        match top_k.trim().parse() {
            Ok(top_k) => config_builder = config_builder.with_top_k(top_k),
            Err(err) => {
                eprintln!(
                    "ignoring invalid RAG_EXPLORER_TOP_K {top_k:?}: {err}"
                );
            }
        }
    }
    let backend = HttpBackend::new(config_builder.build());
    let base_url = backend.config().base_url().to_owned();

    let session = SessionBuilder::with_backend(backend).build();

    print_banner(&base_url);

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Clear => session.conversation().dismiss_error(),
            Command::Upload(path) => upload(&session, path).await,
            Command::Ask(question) => {
                let submission = session.ask(question);
                tokio::pin!(submission);

                let progress_bar = ProgressBar::new_spinner();
                progress_bar.set_style(progress_style.clone());
                progress_bar.set_message("🤔 Thinking...");

                let outcome = loop {
                    progress_bar.inc(1);
                    select! {
                        outcome = &mut submission => break outcome,
                        _ = sleep(Duration::from_millis(100)) => {}
                    }
                };
                progress_bar.finish_and_clear();

                if !print_outcome(&session, outcome).await {
                    break;
                }
            }
        }
    }
}

async fn upload(session: &Session, path: &str) {
    if path.is_empty() {
        print_error(&UploadError::NoFileSelected.to_string());
        return;
    }

    let doc = match Document::read_from(path) {
        Ok(doc) => doc,
        Err(err) => {
            print_error(&format!("Cannot read {path}: {err}"));
            return;
        }
    };
    if !doc.is_supported() {
        println!(
            "{}{} is not one of {}, uploading anyway.",
            BAR_CHAR.bright_yellow(),
            doc.file_name(),
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }

    match session.upload(doc).await {
        Ok(receipt) => {
            println!("{}{}", BAR_CHAR.bright_green(), receipt.message.green());
        }
        Err(err) => print_error(&err.to_string()),
    }
    println!();
}

/// Prints what a settled question added to the transcript. Returns `false`
/// if the conversation has stopped.
async fn print_outcome(session: &Session, outcome: SubmissionOutcome) -> bool {
    let Some(state) = session.conversation().snapshot().await else {
        return false;
    };

    match outcome {
        SubmissionOutcome::Rejected(rejection) => {
            print_error(&rejection.to_string());
        }
        SubmissionOutcome::Answered | SubmissionOutcome::FellBack { .. } => {
            if let Some(turn) = last_answer(&state) {
                print_turn(turn);
            }
            if let Some(error) = state.error_message() {
                print_error(error);
            }
        }
    }
    println!();
    true
}

fn last_answer(state: &ConversationState) -> Option<&Turn> {
    state
        .transcript()
        .last()
        .filter(|turn| turn.role() == Role::Assistant)
}

fn print_turn(turn: &Turn) {
    let bar = BAR_CHAR.bright_cyan();
    println!("{bar}🤖 {}", turn.content().bright_white());
    if turn.sources().is_empty() {
        return;
    }
    println!("{bar}{}", "Sources".bold());
    for source in turn.sources() {
        println!("{bar}  - {}", source.label().dimmed());
    }
}

#[inline]
fn print_error(message: &str) {
    println!("{}{}", BAR_CHAR.bright_red(), message.red());
}

fn print_banner(base_url: &str) {
    for hint in EMPTY_TRANSCRIPT_HINTS {
        println!("{}", hint.bright_white());
    }
    println!(
        "{}",
        "Type a question, /upload <path>, /clear or /quit.".dimmed()
    );
    println!("{}", format!("Backend API: {base_url}").dimmed());
    println!();
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
