//! corpora: command-line client for the corpus service.
//!
//! Every command runs through the same coordinators a graphical front end
//! would use, so validation, confirmation and status wording are identical.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corpora_app::files::load_upload;
use corpora_app::selector::lock;
use corpora_app::{DeletionOutcome, Session, SourceListing};
use corpora_client::{ClientConfig, HttpCorpusApi};
use corpora_core::defaults;
use corpora_core::{ConfirmPrompt, CorpusApi, DeletionMode};

#[derive(Parser)]
#[command(name = "corpora")]
#[command(author, version, about = "Upload, query and prune a PDF corpus")]
#[command(propagate_version = true)]
struct Cli {
    /// API root (overrides config file and CORPORA_API_ROOT)
    #[arg(long, global = true)]
    api_root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known categories
    Categories,

    /// Upload PDF files into a category
    Upload {
        /// Existing category (default: uncategorized)
        #[arg(short, long, conflicts_with = "new_category")]
        category: Option<String>,

        /// Create a new category with this name
        #[arg(short, long)]
        new_category: Option<String>,

        /// Files to upload
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Ask a question across all categories or within one
    Ask {
        /// Restrict the search to one category
        #[arg(short, long)]
        category: Option<String>,

        /// The question
        question: String,
    },

    /// List documents stored in a category
    Docs {
        category: String,
    },

    /// Delete a whole category, or one document with --document
    Delete {
        #[arg(short, long)]
        category: String,

        /// Delete only this document
        #[arg(short, long)]
        document: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Download the file behind a citation link
    Download {
        /// Link as returned in an answer's sources
        reference: String,

        /// Where to write the file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Asks on the terminal; anything but "y"/"yes" declines.
struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{} [y/N] ", message);
        let _ = stderr.flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

struct AssumeYes;

impl ConfirmPrompt for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Logs go to stderr so command output stays clean.
///
///   LOG_FORMAT - "json" for structured output (default: text)
///   LOG_ANSI   - "true"/"false" override ANSI colors
///   RUST_LOG   - standard env filter
fn init_logging() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corpora_app=warn,corpora_client=warn,corpora_core=warn".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        if let Some(ansi) = log_ansi {
            layer = layer.with_ansi(ansi);
        }
        registry.with(layer).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::load().context("Failed to load configuration")?;
    if let Some(api_root) = cli.api_root {
        config.api_root = api_root;
    }
    debug!(api_root = %config.api_root, "Configuration loaded");

    let http = Arc::new(HttpCorpusApi::new(config.clone())?);

    match cli.command {
        Commands::Categories => cmd_categories(http, &config).await,
        Commands::Upload {
            category,
            new_category,
            files,
        } => {
            let session = Session::new(http, &config, Arc::new(TerminalPrompt), None);
            cmd_upload(&session, category, new_category, &files).await
        }
        Commands::Ask { category, question } => {
            let session = Session::new(http, &config, Arc::new(TerminalPrompt), None);
            cmd_ask(&session, category.as_deref(), &question).await
        }
        Commands::Docs { category } => {
            let session = Session::new(http, &config, Arc::new(TerminalPrompt), None);
            cmd_docs(&session, &category).await
        }
        Commands::Delete {
            category,
            document,
            yes,
        } => {
            let confirm: Arc<dyn ConfirmPrompt> = if yes {
                Arc::new(AssumeYes)
            } else {
                Arc::new(TerminalPrompt)
            };
            let session = Session::new(http, &config, confirm, None);
            cmd_delete(&session, &category, document.as_deref()).await
        }
        Commands::Download { reference, output } => {
            cmd_download(http.as_ref(), &reference, &output).await
        }
    }
}

async fn cmd_categories(api: Arc<HttpCorpusApi>, config: &ClientConfig) -> anyhow::Result<()> {
    for category in api.list_categories(config.category_source).await? {
        println!("{}", category);
    }
    Ok(())
}

async fn cmd_upload(
    session: &Session,
    category: Option<String>,
    new_category: Option<String>,
    paths: &[PathBuf],
) -> anyhow::Result<()> {
    session.start().await;
    let upload = &session.upload;

    if let Some(name) = new_category {
        upload.choose(defaults::NEW_CATEGORY_OPTION);
        upload.set_new_category(name);
    } else if let Some(category) = category {
        if !upload.choose(&category) {
            bail!(
                "Unknown category '{}' (use --new-category to create it)",
                category
            );
        }
    }

    let files = paths
        .iter()
        .map(|p| load_upload(p).with_context(|| format!("Failed to read {}", p.display())))
        .collect::<anyhow::Result<Vec<_>>>()?;
    upload.set_files(files);

    match upload.submit().await {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(_) => Err(anyhow!(upload.status().current().message)),
    }
}

async fn cmd_ask(session: &Session, category: Option<&str>, question: &str) -> anyhow::Result<()> {
    session.start().await;
    let query = &session.query;

    if let Some(category) = category {
        if !lock(query.selector()).select(category) {
            bail!("Unknown category '{}'", category);
        }
    }

    match query.ask_selected(question).await {
        Ok(answer) => {
            println!("{}", answer.text);
            println!();
            match &answer.sources {
                SourceListing::Table(rows) => {
                    for row in rows {
                        println!(
                            "- {} ({}, {}) p. {}  {}",
                            row.document, row.category, row.year, row.page, row.download_url
                        );
                    }
                }
                other => println!("{}", other.joined()),
            }
            Ok(())
        }
        Err(_) => Err(anyhow!(query.status().current().message)),
    }
}

async fn cmd_docs(session: &Session, category: &str) -> anyhow::Result<()> {
    session.start().await;
    let deletion = &session.deletion;
    deletion.set_mode(DeletionMode::Document);

    if !deletion.select_document_category(category).await {
        bail!("Unknown category '{}'", category);
    }

    let documents = lock(deletion.document_selector()).clone();
    if documents
        .options()
        .iter()
        .any(|o| o.label == defaults::DOCUMENTS_ERROR_LABEL)
    {
        bail!("{}", defaults::DOCUMENTS_ERROR_LABEL);
    }

    for option in documents.options().iter().filter(|o| !o.value.is_empty()) {
        println!("{}", option.value);
    }
    Ok(())
}

async fn cmd_delete(
    session: &Session,
    category: &str,
    document: Option<&str>,
) -> anyhow::Result<()> {
    session.start().await;
    let deletion = &session.deletion;

    match document {
        Some(document) => {
            deletion.set_mode(DeletionMode::Document);
            if !deletion.select_document_category(category).await {
                bail!("Unknown category '{}'", category);
            }
            if !deletion.select_document(document) {
                bail!("No document '{}' in '{}'", document, category);
            }
        }
        None => {
            deletion.set_mode(DeletionMode::Category);
            if !deletion.select_wipe_category(category) {
                bail!("Unknown category '{}'", category);
            }
        }
    }

    match deletion.execute().await {
        Ok(DeletionOutcome::Declined) => {
            println!("Cancelled.");
            Ok(())
        }
        Ok(DeletionOutcome::Deleted {
            message,
            scheduled_refresh,
        }) => {
            println!("{}", message);
            if let Some(refresh) = scheduled_refresh {
                let remaining = refresh.await.context("Directory refresh did not finish")?;
                debug!(category_count = remaining.len(), "Directory refreshed");
            }
            Ok(())
        }
        Err(_) => Err(anyhow!(deletion.status().current().message)),
    }
}

async fn cmd_download(api: &HttpCorpusApi, reference: &str, output: &Path) -> anyhow::Result<()> {
    let bytes = api.download(reference).await?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved {} bytes to {}", bytes.len(), output.display());
    Ok(())
}
