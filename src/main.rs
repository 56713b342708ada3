//! Briefwright - turn a project brief into requirements, estimates and a plan.
//!
//! Collects a project brief interactively or from a markdown file and runs
//! the generation pipeline against the configured providers.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use briefwright::core::Config;
use briefwright::session::{NextQuestion, SessionId, SessionResult};
use briefwright::{
    parse_brief, render_template, ArtifactBundle, SessionError, SessionRegistry,
    WorkflowOrchestrator,
};

/// Turn a project brief into requirements, estimates and a task plan
#[derive(Parser)]
#[command(name = "briefwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a blank markdown brief to fill in
    Template,

    /// Generate artifacts from a filled brief
    Generate {
        /// Markdown brief to read
        file: PathBuf,

        /// Write the artifacts here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also generate .cursorrules content and write it to this file
        #[arg(long, value_name = "FILE")]
        cursor_rules: Option<PathBuf>,
    },

    /// Answer questions interactively, then generate
    Collect {
        /// Write the artifacts here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Show config directory path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    // API keys may live in a local .env file
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Template => {
            print!("{}", render_template());
        }
        Commands::Generate { file, output, cursor_rules } => {
            cmd_generate(&file, output.as_deref(), cursor_rules.as_deref())?;
        }
        Commands::Collect { output } => {
            cmd_collect(output.as_deref())?;
        }
        Commands::Config { path } => {
            cmd_config(path)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Parse a brief file and run the pipeline.
fn cmd_generate(file: &Path, output: Option<&Path>, rules_path: Option<&Path>) -> Result<()> {
    let markdown = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read brief {}", file.display()))?;
    let brief = parse_brief(&markdown)?;

    for key in brief.low_confidence_fields() {
        eprintln!("warning: '{key}' was accepted without validation");
    }

    let config = Config::load()?;
    let orchestrator = WorkflowOrchestrator::from_config(&config)?
        .with_cursor_rules(config.orchestrator.cursor_rules || rules_path.is_some());

    let rt = tokio::runtime::Runtime::new()?;
    let bundle = rt.block_on(async {
        eprintln!("Generating artifacts...");
        orchestrator.run(&brief).await
    })?;

    if let (Some(path), Some(rules)) = (rules_path, bundle.cursor_rules.as_deref()) {
        std::fs::write(path, format!("{rules}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Cursor rules written to {}", path.display());
    }

    write_bundle(&bundle, output)
}

/// Run an interactive session on stdin/stdout.
fn cmd_collect(output: Option<&Path>) -> Result<()> {
    let config = Config::load()?;
    let orchestrator = Arc::new(WorkflowOrchestrator::from_config(&config)?);
    let registry = SessionRegistry::new(orchestrator, config.session.clone());

    let rt = tokio::runtime::Runtime::new()?;
    let bundle = rt.block_on(async {
        let id = registry.create_session();
        let outcome = converse(&registry, id).await;
        if outcome.as_ref().is_ok_and(Option::is_none) {
            registry.close_session(id).ok();
        }
        outcome
    })?;

    match bundle {
        Some(bundle) => write_bundle(&bundle, output),
        None => {
            println!("Session closed.");
            Ok(())
        }
    }
}

/// Drive one session to completion. Returns `None` when the user quits.
async fn converse(registry: &SessionRegistry, id: SessionId) -> Result<Option<ArtifactBundle>> {
    println!("Describe your project. Commands: /skip (skip this question), /done (skip remaining optional questions), /quit\n");

    let mut stdin = io::stdin().lock();
    let mut question = registry.get_state(id)?.question;

    loop {
        let Some(current) = question.take() else {
            // brief is complete and waiting for the go-ahead
            if !ask_yes_no(&mut stdin, "Generate artifacts now? [Y/n] ", true)? {
                return Ok(None);
            }
            println!("Generating artifacts...");
            match handle(registry.confirm(id).await)? {
                Turn::Done(bundle) => return Ok(Some(bundle)),
                Turn::Ask(next) => question = next,
            }
            continue;
        };

        print_question(&current);
        let Some(line) = read_line(&mut stdin)? else { return Ok(None) };

        let result = match line.trim() {
            "/quit" => return Ok(None),
            "/skip" => match registry.skip_field(id, current.field).await {
                Err(SessionError::RequiredField(_)) => {
                    println!("  This question is required.\n");
                    question = Some(current);
                    continue;
                }
                other => other,
            },
            "/done" => registry.skip_optional(id).await,
            answer => registry.submit_answer(id, current.field, answer.to_string()).await,
        };

        match handle(result)? {
            Turn::Done(bundle) => return Ok(Some(bundle)),
            Turn::Ask(next) => question = next,
        }
    }
}

enum Turn {
    Ask(Option<NextQuestion>),
    Done(ArtifactBundle),
}

/// Report one turn's outcome to the user.
fn handle(result: Result<SessionResult, SessionError>) -> Result<Turn> {
    match result {
        Ok(SessionResult::Accepted { low_confidence, question, .. }) => {
            if low_confidence {
                println!("  Accepted as given (could not be validated).\n");
            }
            Ok(Turn::Ask(Some(question)))
        }
        Ok(SessionResult::Rejected { reason, attempt, question, .. }) => {
            println!("  Not quite: {reason} (attempt {attempt})\n");
            Ok(Turn::Ask(Some(question)))
        }
        Ok(SessionResult::Skipped { question, .. }) => Ok(Turn::Ask(Some(question))),
        Ok(SessionResult::AwaitingConfirmation) => Ok(Turn::Ask(None)),
        Ok(SessionResult::Complete(bundle)) => Ok(Turn::Done(*bundle)),
        Err(SessionError::Generation(e)) => {
            eprintln!("Generation failed: {e}");
            Ok(Turn::Ask(None))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_question(question: &NextQuestion) {
    let marker = if question.required { " *" } else { "" };
    println!("[{}{}] {}", question.label, marker, question.question);
    print!("> ");
    io::stdout().flush().ok();
}

fn read_line(stdin: &mut impl BufRead) -> Result<Option<String>> {
    let mut input = String::new();
    if stdin.read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}

fn ask_yes_no(stdin: &mut impl BufRead, prompt: &str, default: bool) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    Ok(match read_line(stdin)?.as_deref().map(str::trim) {
        Some("") => default,
        Some(answer) => answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"),
        None => false,
    })
}

/// Print or save the artifacts as pretty JSON.
fn write_bundle(bundle: &ArtifactBundle, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(bundle)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Artifacts written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "briefwright", &mut io::stdout());
}
