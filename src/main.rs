mod app;
mod components;
mod config;
mod editor;
mod error;
mod event;
mod fs;
mod handler;
mod jobs;
mod layout;
mod nav;
mod resource;
mod theme;
mod tree;
mod tui;
mod ui;
mod viewer;
mod viewport;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, LoggingConfig};
use crate::event::{Event, EventHandler};
use crate::jobs::JobRunner;
use crate::tui::{install_panic_hook, Tui};
use crate::viewer::LoadContext;

/// Browse a directory tree and view or edit its files in the terminal.
#[derive(Parser, Debug)]
#[command(name = "dmc-nav", version, about)]
struct Cli {
    /// Starting directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// List hidden entries
    #[arg(long)]
    show_hidden: bool,
}

impl Cli {
    /// Flags that override config file values.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: self.show_hidden.then_some(true),
            },
            logging: LoggingConfig {
                file: self.log_file.clone(),
                level: None,
            },
            ..AppConfig::default()
        }
    }
}

/// Send logs to a file; the terminal belongs to the UI. Any failure leaves
/// logging off.
fn init_file_logging(log_path: &Path, level: &str) {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() && std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(log_file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .try_init();
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    let path = cli.path.canonicalize().map_err(|_| {
        error::AppError::InvalidPath(format!("{} does not exist", cli.path.display()))
    })?;
    if !path.is_dir() {
        return Err(error::AppError::InvalidPath(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    let (config, warnings) = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    if let Some(log_path) = config.log_file() {
        init_file_logging(&log_path, config.log_level());
    }
    for warning in &warnings {
        warn!("{warning}");
    }
    info!(root = %path.display(), "starting");

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut app = App::new(path, &config);
    let mut events = EventHandler::new(Duration::from_millis(250));
    let jobs = JobRunner::new(
        events.sender(),
        LoadContext::new(config.syntax_theme_name(), config.markdown_wrap()),
    );

    let (width, height) = tui.size()?;
    app.handle_event(Event::Resize(width, height));

    loop {
        tui.terminal_mut().draw(|frame| ui::render(&app, frame))?;

        let event = events.next().await?;
        for command in app.handle_event(event) {
            jobs.spawn(command);
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    info!("exiting");
    Ok(())
}
