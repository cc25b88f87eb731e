//! Application logging functionality
//!
//! The GUI path lets Bevy's `LogPlugin` own the tracing subscriber; the
//! headless path installs its own subscriber with an additional daily
//! log file under the user config directory.

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Get the path to the fontgrab config directory
fn config_dir() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
    config_dir.join("fontgrab")
}

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fontgrab=info"))
}

/// Set up logging for a headless run: console output plus a daily log
/// file. The returned guard must be held for the lifetime of the run so
/// buffered lines get flushed.
pub fn init_headless() -> Option<WorkerGuard> {
    let file_layer = match fs::create_dir_all(logs_dir()) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(logs_dir(), "fontgrab.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Some((
                tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false),
                guard,
            ))
        }
        Err(error) => {
            eprintln!("Could not create log directory: {error}");
            None
        }
    };

    match file_layer {
        Some((layer, guard)) => {
            tracing_subscriber::registry()
                .with(default_filter())
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .with(layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(default_filter())
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .init();
            None
        }
    }
}

/// Filter string handed to Bevy's `LogPlugin` for GUI runs.
pub fn gui_log_filter() -> String {
    #[cfg(debug_assertions)]
    {
        "fontgrab=debug,bevy_render=warn,bevy_winit=warn,wgpu=warn,winit=warn".to_string()
    }
    #[cfg(not(debug_assertions))]
    {
        "fontgrab=info,bevy=warn,wgpu=error,winit=error".to_string()
    }
}
