#![deny(unused_must_use)]

use std::io;
use std::path::PathBuf;

use chrono::Local;
use ratatui::{backend::CrosstermBackend, Terminal};
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing::info;
use tracing_subscriber::{filter, prelude::*};
use tracing_subscriber::{fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(not(any(debug_assertions, feature = "portable")))]
use directories::BaseDirs;

pub mod args;
pub mod errors;
pub mod graph;
pub mod sessions;

mod app;
mod event;
mod handler;
mod panic_handler;
mod settings;
mod tui;
mod ui;
mod utils;
mod widgets;

use crate::app::App;
use args::{ExportCmd, SubCommands, TopLevelCmd};
use errors::AppError;
use event::Event;
use event::EventHandler;
use handler::handle_key_events;
use sessions::store::{JsonSessionStore, SessionStore};
use settings::{resolve_config_path, Settings};
use tui::Tui;

/// Application result type.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub fn run(arg_config: TopLevelCmd) -> AppResult<()> {
    let working_directory = determine_working_directory().ok_or(AppError::WorkDir)?;
    if !working_directory.exists() {
        std::fs::create_dir_all(&working_directory).map_err(|e| AppError::CreateDir {
            path: working_directory.clone(),
            source: e,
        })?;
    }
    std::env::set_current_dir(&working_directory).expect("Failed to change working directory");

    // Headless export never touches the terminal or the log file.
    if let Some(SubCommands::Export(cmd)) = &arg_config.subcommands {
        return run_export(&arg_config, cmd);
    }

    let log_name = std::env::current_exe()?
        .with_extension("log")
        .file_name()
        .expect("Couldn't build log path!")
        .to_owned();
    let file_appender = BasicRollingFileAppender::new(
        log_name,
        RollingConditionBasic::new().max_size(1024 * 1024 * 5),
        2,
    )
    .expect("Couldn't build log file appender!");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let time_fmt = ChronoLocal::new("%Y-%m-%d %H:%M:%S%.6f".to_owned());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_file(false)
        .with_ansi(false)
        .with_target(true)
        .with_timer(time_fmt)
        .with_line_number(true)
        .with_filter(filter::LevelFilter::DEBUG);
    let (fmt_layer, reload_handle) = tracing_subscriber::reload::Layer::new(fmt_layer);
    let env_filter = tracing_subscriber::EnvFilter::new("trace");
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    let mut app = App::build(&arg_config)?;
    // Try to create a default config file
    app.save_settings(&arg_config)?;

    // Starting off at DEBUG, and setting to whatever user has defined
    reload_handle.modify(|layer| *layer.filter_mut() = app.settings.get_log_level())?;

    app.init();

    // Initialize the terminal user interface.
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    let events = EventHandler::new(100);
    let mut tui = Tui::new(terminal, events);
    panic_handler::initialize_panic_handler()?;
    tui.init()?;

    info!("Starting app... v{}", env!("CARGO_PKG_VERSION"));

    // Start the main loop.
    while !app.should_quit {
        // Render the user interface.
        tui.draw(&mut app)?;
        match tui.events.next()? {
            Event::Tick => app.term_tick(),
            Event::Key(key_event) => handle_key_events(&mut app, key_event)?,
            Event::Resize => {
                app.on_resize();
                tui.autoresize()?;
            }
        }
    }

    info!("Shutting down gracefully...");

    // Reset the terminal.
    tui.exit()?;
    Ok(())
}

fn run_export(arg_config: &TopLevelCmd, cmd: &ExportCmd) -> AppResult<()> {
    let config_path = resolve_config_path(arg_config.config_override.as_deref());
    let settings = Settings::load(&config_path, arg_config.config_required)?;
    let store = JsonSessionStore::new(settings.storage.data_file.clone());
    let sessions = store.load();
    if sessions.is_empty() {
        eprintln!("No data to export.");
        return Ok(());
    }

    let dir = cmd.out_dir.clone().unwrap_or_else(|| {
        if settings.export.dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&settings.export.dir)
        }
    });
    let path = sessions::export::write_report(
        &sessions,
        &dir,
        settings.misc.use_12hr_time,
        Local::now(),
    )?;
    println!("Exported {} session(s) to {}", sessions.len(), path.display());
    Ok(())
}

/// Returns the directory that logs, config, and other files should be placed in by default.
// The rules for how it determines the directory is as follows:
// If the app is built with the portable feature, it will just return it's parent directory.
// If there is a config file present adjacent to the executable, the executable's parent path is returned.
// Otherwise, it will return the `directories` `config_dir` output.
//
// Debug builds are always portable. Release builds can optionally have the "portable" feature enabled.
fn determine_working_directory() -> Option<PathBuf> {
    let portable = is_portable();
    let exe_path = std::env::current_exe().expect("Failed to get executable path");
    let exe_parent = exe_path
        .parent()
        .expect("Couldn't get parent dir of executable")
        .to_path_buf();
    let config_path = exe_path.with_extension("toml");

    if portable || config_path.exists() {
        Some(exe_parent)
    } else {
        get_user_dir()
    }
}

#[cfg(any(debug_assertions, feature = "portable"))]
fn is_portable() -> bool {
    true
}

#[cfg(not(any(debug_assertions, feature = "portable")))]
fn is_portable() -> bool {
    false
}

#[cfg(any(debug_assertions, feature = "portable"))]
fn get_user_dir() -> Option<PathBuf> {
    None
}

#[cfg(not(any(debug_assertions, feature = "portable")))]
fn get_user_dir() -> Option<PathBuf> {
    if let Some(base_dirs) = BaseDirs::new() {
        let mut config_dir = base_dirs.config_dir().to_owned();
        config_dir.push(env!("CARGO_PKG_NAME"));
        Some(config_dir)
    } else {
        None
    }
}
