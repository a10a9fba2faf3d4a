use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roster_config::{get_config_path, get_log_dir, Config};
use roster_store::RecordStore;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

mod session;

use session::Session;

const MAIN_HELP: &str = r#"Roster is an interactive manager for a small list of users (username, name,
email, phone, age) kept in a single JSON file.

Run `roster` with no command to open the menu. Every change is written back to
the data file immediately. The data file defaults to `data.json` in the current
directory; override it with --data-file, ROSTER_DATA_FILE or the [store]
section of the config file."#;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = MAIN_HELP)]
#[command(version)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "ROSTER_DATA_FILE",
        help = "JSON file holding the user records"
    )]
    data_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Config file to use instead of the default")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print config file location and contents.")]
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    init_logging(&config)?;

    let data_file = config.data_file(cli.data_file.as_deref());

    match cli.command {
        Some(Commands::Config) => handle_config(&config_path, &data_file),
        None => handle_session(&config, &data_file),
    }
}

/// Logging never blocks the session: without a usable log file, events are
/// discarded.
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.logging.level.parse()?);

    let (writer, log_error) = match get_log_dir().map(|dir| open_log_file(&dir)) {
        Some(Ok(file)) => (BoxMakeWriter::new(Mutex::new(file)), None),
        Some(Err(e)) => (BoxMakeWriter::new(std::io::sink), Some(e)),
        None => (BoxMakeWriter::new(std::io::sink), None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    if let Some(e) = log_error {
        warn!("Log file unavailable: {}", e);
    }
    Ok(())
}

fn open_log_file(log_dir: &Path) -> std::io::Result<File> {
    std::fs::create_dir_all(log_dir)?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("roster.log"))
}

fn handle_config(config_path: &Path, data_file: &Path) -> Result<()> {
    println!("Config file: {}", config_path.display());
    println!();

    if config_path.exists() {
        println!("{}", std::fs::read_to_string(config_path)?);
    } else {
        println!("(file does not exist, using defaults)");
        println!();
    }
    println!("Data file: {}", data_file.display());
    Ok(())
}

fn handle_session(config: &Config, data_file: &Path) -> Result<()> {
    let store = RecordStore::open(data_file)
        .with_context(|| format!("Cannot start with data file {}", data_file.display()))?
        .with_indent(config.display.indent);

    info!("Starting session on {}", store.path().display());
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Session::new(store, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}
