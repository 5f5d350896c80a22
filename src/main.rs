use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use trust_guardian::config::Config;
use trust_guardian::db::models::ContentType;
use trust_guardian::db::sqlite::SqliteDatabase;
use trust_guardian::db::{self, Database};
use trust_guardian::detectors::traits::DetectorKind;
use trust_guardian::detectors::DetectorSet;
use trust_guardian::mcp::McpServer;
use trust_guardian::output::terminal;
use trust_guardian::pipeline::batch::{self, BatchOptions};
use trust_guardian::pipeline::Recorder;
use trust_guardian::scoring::Analyzer;
use trust_guardian::steering::{SteeringManager, SteeringUpdate, UiTheme};

/// Trust Guardian: score content for spam, scams, toxicity and deepfakes.
///
/// Every item gets four independent signals, adjusted by your strictness
/// setting and combined into one verdict.
#[derive(Parser)]
#[command(name = "trust-guardian", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Score one piece of content
    Analyze {
        /// The text to score (or use --file)
        text: Option<String>,

        /// Read the content from a file instead
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// email, comment, review, text or ocr_image
        #[arg(long, default_value = "text", value_parser = parse_content_type)]
        content_type: ContentType,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,

        /// Don't save the result to history
        #[arg(long)]
        no_record: bool,
    },

    /// Score many items from a file (JSON string array, or one per line)
    Batch {
        #[arg(long)]
        file: PathBuf,

        #[arg(long, default_value = "email", value_parser = parse_content_type)]
        content_type: ContentType,

        /// Number of items to score in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        #[arg(long)]
        json: bool,

        #[arg(long)]
        no_record: bool,
    },

    /// Show or change steering settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show recent analyses
    History {
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Only show items flagged as threats
        #[arg(long)]
        threats: bool,
    },

    /// Show notifications (unread only unless --all)
    Notifications {
        #[arg(long)]
        all: bool,

        /// Mark everything read after listing
        #[arg(long)]
        mark_read: bool,
    },

    /// Show system status (database, detectors, settings, history)
    Status,

    /// Run the MCP analyzer server on stdin/stdout
    Mcp,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,

    /// Change one or more settings
    Set {
        /// Detection strictness, 1-10 (7 is neutral)
        #[arg(long)]
        strictness: Option<u8>,

        /// Visual haunting intensity, 1-10
        #[arg(long)]
        haunting: Option<u8>,

        /// Detectors to turn on (spam, scam, toxicity, deepfake)
        #[arg(long, value_delimiter = ',', value_parser = parse_detector)]
        enable: Vec<DetectorKind>,

        /// Detectors to turn off
        #[arg(long, value_delimiter = ',', value_parser = parse_detector)]
        disable: Vec<DetectorKind>,

        /// day, night or haunted
        #[arg(long, value_parser = parse_theme)]
        theme: Option<UiTheme>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries MCP responses and --json output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trust_guardian=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing Trust Guardian database...");
            let db = db::open_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("Detectors: {}", config.remote_summary());
            println!("\nTrust Guardian is ready. Optional: set HUGGING_FACE_API_KEY and");
            println!("PERSPECTIVE_API_KEY in your .env to use hosted classifiers.");
        }

        Commands::Analyze {
            text,
            file,
            content_type,
            json,
            no_record,
        } => {
            let content = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("Nothing to analyze. Pass the text or --file <path>."),
            };
            if content.trim().is_empty() {
                bail!("Content is empty; nothing to analyze.");
            }

            let db = db::open_sqlite(&config.db_path)?;
            let steering = SteeringManager::open(db.clone()).await;
            let snapshot = steering.get().await;
            let analyzer = Analyzer::new(DetectorSet::from_config(&config)?);

            let analysis = analyzer.analyze(&content, &snapshot).await;

            if !no_record {
                let recorder = Recorder::new(db.clone(), config.user_id.clone());
                match recorder.record(content_type, &content, &analysis.score).await {
                    Ok(id) => info!(analysis_id = id, "Analysis saved"),
                    Err(e) => warn!(error = %e, "Failed to save analysis"),
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                terminal::display_analysis(&analysis);
            }
        }

        Commands::Batch {
            file,
            content_type,
            concurrency,
            json,
            no_record,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let items = batch::parse_items(&raw)?;
            if items.iter().all(|i| i.trim().is_empty()) {
                bail!("{} contains no content to analyze.", file.display());
            }

            let db = db::open_sqlite(&config.db_path)?;
            let steering = SteeringManager::open(db.clone()).await;
            let snapshot = steering.get().await;
            let analyzer = Analyzer::new(DetectorSet::from_config(&config)?);
            let recorder = Recorder::new(db.clone(), config.user_id.clone());

            let options = BatchOptions {
                content_type,
                concurrency,
                show_progress: !json,
            };
            let report = batch::scan(
                &analyzer,
                &snapshot,
                &items,
                &options,
                (!no_record).then_some(&recorder),
            )
            .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                terminal::display_batch(&report);
            }
        }

        Commands::Config { action } => {
            let db = db::open_sqlite(&config.db_path)?;
            let steering = SteeringManager::open(db).await;

            match action {
                ConfigAction::Show => {
                    terminal::display_steering(&steering.get().await);
                }
                ConfigAction::Set {
                    strictness,
                    haunting,
                    enable,
                    disable,
                    theme,
                } => {
                    let update = build_update(strictness, haunting, &enable, &disable, theme);
                    if update.is_empty() {
                        bail!("Nothing to change. See `trust-guardian config set --help`.");
                    }
                    let updated = steering.set(&update).await?;
                    println!("{}", "Settings saved.".green());
                    terminal::display_steering(&updated);
                }
            }
        }

        Commands::History { limit, threats } => {
            let db = db::open_sqlite(&config.db_path)?;
            let records = db
                .get_recent_analyses(&config.user_id, limit, threats)
                .await?;
            terminal::display_history(&records);
            if !records.is_empty() {
                let stats = db.get_history_stats(&config.user_id).await?;
                terminal::display_stats(&stats);
            }
        }

        Commands::Notifications { all, mark_read } => {
            let db = db::open_sqlite(&config.db_path)?;
            let notifications = db.get_notifications(&config.user_id, !all, 50).await?;
            terminal::display_notifications(&notifications);
            if mark_read {
                let marked = db.mark_notifications_read(&config.user_id).await?;
                println!("{}", format!("Marked {marked} notifications read.").dimmed());
            }
        }

        Commands::Status => {
            if !trust_guardian::status::database_exists(&config) {
                println!("Database: not initialized");
                println!("\nRun `trust-guardian init` to set up the database.");
                return Ok(());
            }
            let db = db::open_sqlite(&config.db_path)?;
            let steering = SteeringManager::open(db.clone()).await;
            let snapshot = steering.get().await;
            let db: Arc<dyn Database> = db;
            trust_guardian::status::show(&db, &config, &snapshot).await?;
        }

        Commands::Mcp => {
            let db: Arc<SqliteDatabase> = db::open_sqlite(&config.db_path)?;
            let steering = Arc::new(SteeringManager::open(db).await);
            let analyzer = Arc::new(Analyzer::new(DetectorSet::from_config(&config)?));
            info!(detectors = %config.remote_summary(), "Starting MCP server");
            McpServer::new(analyzer, steering).run().await?;
        }
    }

    Ok(())
}

/// Collect `config set` flags into one update. A detector named in both
/// lists ends up disabled.
fn build_update(
    strictness: Option<u8>,
    haunting: Option<u8>,
    enable: &[DetectorKind],
    disable: &[DetectorKind],
    theme: Option<UiTheme>,
) -> SteeringUpdate {
    let mut update = SteeringUpdate::default();
    if let Some(level) = strictness {
        update = update.strictness(level);
    }
    if let Some(level) = haunting {
        update = update.haunting(level);
    }
    for &kind in enable {
        update = update.agent(kind, true);
    }
    for &kind in disable {
        update = update.agent(kind, false);
    }
    if let Some(theme) = theme {
        update = update.theme(theme);
    }
    update
}

fn parse_content_type(s: &str) -> Result<ContentType, String> {
    ContentType::parse(s).ok_or_else(|| {
        format!("unknown content type '{s}' (email, comment, review, text, ocr_image)")
    })
}

fn parse_detector(s: &str) -> Result<DetectorKind, String> {
    DetectorKind::parse(s)
        .ok_or_else(|| format!("unknown detector '{s}' (spam, scam, toxicity, deepfake)"))
}

fn parse_theme(s: &str) -> Result<UiTheme, String> {
    UiTheme::parse(s).ok_or_else(|| format!("unknown theme '{s}' (day, night, haunted)"))
}
