use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;

use stocknews::app::App;
use stocknews::config::{Config, STORE_ENV_VAR};
use stocknews::keybindings::KeybindingRegistry;
use stocknews::session::Session;
use stocknews::store::CsvStore;
use stocknews::ui;

/// Get the config directory path (~/.config/stocknews/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("stocknews"))
}

/// Send logs to a file; the TUI owns the terminal.
fn init_logging(config_dir: &std::path::Path) -> Result<PathBuf> {
    let log_path = config_dir.join("stocknews.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(log_path)
}

#[derive(Parser, Debug)]
#[command(
    name = "stocknews",
    about = "Consolidate stock news workbooks into a CSV dataset and browse it"
)]
struct Args {
    /// Dataset CSV file (overrides STOCKNEWS_STORE and the config file)
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Config file (default: ~/.config/stocknews/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Workbook to load on startup, opening the import view
    #[arg(long, value_name = "FILE", conflicts_with = "consolidate")]
    workbook: Option<PathBuf>,

    /// Extract a workbook, merge it into the dataset and exit without the UI
    #[arg(long, value_name = "FILE")]
    consolidate: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }
    let log_path = init_logging(&config_dir)?;
    tracing::info!(log = %log_path.display(), "Starting stocknews");

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let env_store = std::env::var(STORE_ENV_VAR).ok();
    let store_path = config.resolve_store_path(args.store.as_deref(), env_store.as_deref());
    tracing::info!(store = %store_path.display(), "Using dataset");

    let mut session = Session::new(Box::new(CsvStore::new(store_path)), config.extract);

    if let Some(workbook) = args.consolidate {
        return consolidate_headless(&mut session, workbook);
    }

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(warning = %warning, "Keybinding override ignored");
        eprintln!("Warning: {}", warning);
    }

    let mut app = App::new(session, keybindings, config.status_timeout());
    app.reload();
    if let Some(workbook) = args.workbook {
        app.extract(workbook);
    }

    ui::run(&mut app).await?;

    tracing::info!("Exiting");
    Ok(())
}

/// Run extract + consolidate once, printing every notice.
fn consolidate_headless(session: &mut Session, workbook: PathBuf) -> Result<()> {
    let mut failed = false;
    for notice in session.extract(&workbook) {
        failed |= notice.is_error() && session.extracted().is_none();
        println!("{}", notice);
    }
    if failed {
        anyhow::bail!("Could not read workbook '{}'", workbook.display());
    }

    let notices = session.consolidate();
    let errors = notices.iter().filter(|n| n.is_error()).count();
    for notice in notices {
        println!("{}", notice);
    }
    if errors > 0 {
        anyhow::bail!("Consolidation into {} failed", session.store_location());
    }
    Ok(())
}
