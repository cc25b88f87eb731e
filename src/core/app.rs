//! Application initialization and configuration

use anyhow::Result;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;

use crate::core::cli::CliArgs;
use crate::core::config::FontCatalog;
use crate::core::settings::{DEFAULT_WINDOW_SIZE, WINDOW_TITLE};
use crate::ui::{ProgressUiPlugin, SessionConfig};

/// Creates a fully configured Bevy GUI application ready to run
pub fn create_app(cli_args: CliArgs) -> Result<App> {
    cli_args
        .validate()
        .map_err(|e| anyhow::anyhow!("CLI validation failed: {}", e))?;

    let catalog = FontCatalog::load(cli_args.config.as_deref());
    let staging_dir = cli_args.staging_dir();

    let mut app = App::new();
    app.insert_resource(SessionConfig {
        catalog,
        staging_dir,
    })
    .insert_resource(cli_args)
    .insert_resource(ClearColor(crate::ui::theme::BACKGROUND_COLOR));

    // Continuous updates: progress arrives over a channel, not through
    // window events, so the reactive desktop mode would stall the bar.
    app.insert_resource(bevy::winit::WinitSettings {
        focused_mode: bevy::winit::UpdateMode::Continuous,
        unfocused_mode: bevy::winit::UpdateMode::Continuous,
    });

    app.add_plugins(configure_default_plugins());
    app.add_plugins(ProgressUiPlugin);
    Ok(app)
}

/// Configure default Bevy plugins for the application
fn configure_default_plugins() -> bevy::app::PluginGroupBuilder {
    DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: WINDOW_TITLE.to_string(),
                resolution: DEFAULT_WINDOW_SIZE.into(),
                resizable: false,
                ..default()
            }),
            ..default()
        })
        .set(configure_logging())
}

/// Configure logging with performance optimization for release builds
fn configure_logging() -> LogPlugin {
    LogPlugin {
        level: Level::INFO,
        filter: crate::logging::gui_log_filter(),
        ..default()
    }
}
