//! The progress window.
//!
//! A single fixed layout: title, status line, progress bar, and a
//! Download/Close button row, with a summary overlay once the run
//! finishes. All state arrives over the worker channel; these systems
//! never touch the network or the filesystem.

use bevy::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::core::config::FontCatalog;
use crate::core::settings::MAX_LISTED_FAILURES;
use crate::ui::theme::*;
use crate::worker::{RunSummary, WorkerMessage};

/// What the session is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Done,
}

/// Catalog and staging directory handed to the worker when the user
/// presses Download.
#[derive(Resource)]
pub struct SessionConfig {
    pub catalog: FontCatalog,
    pub staging_dir: std::path::PathBuf,
}

/// Aggregate progress as the UI sees it.
#[derive(Resource, Default)]
pub struct InstallProgress {
    pub phase: RunPhase,
    pub total: usize,
    pub completed: usize,
    pub current_family: Option<String>,
    pub summary: Option<RunSummary>,
}

impl InstallProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }

    pub fn status_line(&self) -> String {
        match self.phase {
            RunPhase::Idle => "Press Download to begin".to_string(),
            RunPhase::Running => match &self.current_family {
                Some(family) => format!("Downloading {family}..."),
                None => "Starting...".to_string(),
            },
            RunPhase::Done => "Download completed. You can close this window.".to_string(),
        }
    }
}

/// Receiving end of the worker channel; inserted when the run starts.
#[derive(Resource)]
pub struct WorkerChannel {
    pub receiver: UnboundedReceiver<WorkerMessage>,
}

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct ProgressFill;

#[derive(Component)]
struct DownloadButton;

#[derive(Component)]
struct CloseButton;

#[derive(Component)]
struct SummaryPanel;

pub struct ProgressUiPlugin;

impl Plugin for ProgressUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InstallProgress>()
            .add_systems(Startup, setup_ui)
            .add_systems(
                Update,
                (
                    handle_download_button,
                    handle_close_button,
                    style_buttons,
                    drain_worker_messages,
                    update_status_text,
                    update_progress_fill,
                    show_summary_panel,
                    exit_on_esc,
                ),
            );
    }
}

fn setup_ui(mut commands: Commands) {
    commands.spawn(Camera2d);

    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Stretch,
            padding: UiRect::all(Val::Px(WINDOW_PADDING)),
            row_gap: Val::Px(ROW_SPACING),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Fontgrab"),
                TextFont {
                    font_size: TITLE_FONT_SIZE,
                    ..default()
                },
                TextColor(TEXT_PRIMARY),
            ));

            parent.spawn((
                StatusText,
                Text::new("Press Download to begin"),
                TextFont {
                    font_size: STATUS_FONT_SIZE,
                    ..default()
                },
                TextColor(TEXT_SECONDARY),
            ));

            // Progress bar: a fixed track with a percent-width fill.
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Px(PROGRESS_BAR_HEIGHT),
                        ..default()
                    },
                    BackgroundColor(PROGRESS_TRACK_COLOR),
                ))
                .with_children(|track| {
                    track.spawn((
                        ProgressFill,
                        Node {
                            width: Val::Percent(0.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(PROGRESS_FILL_COLOR),
                    ));
                });

            parent
                .spawn(Node {
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::SpaceBetween,
                    margin: UiRect::top(Val::Px(ROW_SPACING)),
                    ..default()
                })
                .with_children(|row| {
                    spawn_button(row, DownloadButton, "Download Fonts");
                    spawn_button(row, CloseButton, "Close");
                });
        });
}

fn spawn_button(parent: &mut ChildSpawnerCommands, marker: impl Component, label: &str) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(BUTTON_WIDTH),
                height: Val::Px(BUTTON_HEIGHT),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BUTTON_COLOR),
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(label),
                TextFont {
                    font_size: BUTTON_FONT_SIZE,
                    ..default()
                },
                TextColor(TEXT_PRIMARY),
            ));
        });
}

/// Start the worker on the first press; later presses are ignored.
fn handle_download_button(
    mut commands: Commands,
    interactions: Query<&Interaction, (Changed<Interaction>, With<DownloadButton>)>,
    session: Res<SessionConfig>,
    mut progress: ResMut<InstallProgress>,
) {
    for interaction in &interactions {
        if *interaction == Interaction::Pressed && progress.phase == RunPhase::Idle {
            let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
            // The worker detaches; it reports back over the channel.
            let _ = crate::worker::spawn(session.catalog.clone(), session.staging_dir.clone(), sender);
            commands.insert_resource(WorkerChannel { receiver });
            progress.phase = RunPhase::Running;
            progress.total = session.catalog.len();
            info!(families = progress.total, "download started");
        }
    }
}

fn handle_close_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<CloseButton>)>,
    mut exit: EventWriter<AppExit>,
) {
    for interaction in &interactions {
        if *interaction == Interaction::Pressed {
            exit.write(AppExit::Success);
        }
    }
}

fn style_buttons(
    mut buttons: Query<
        (
            &Interaction,
            &mut BackgroundColor,
            Option<&DownloadButton>,
        ),
        With<Button>,
    >,
    progress: Res<InstallProgress>,
) {
    for (interaction, mut color, download) in &mut buttons {
        // The download button goes inert once a run has started.
        if download.is_some() && progress.phase != RunPhase::Idle {
            *color = BackgroundColor(BUTTON_DISABLED_COLOR);
            continue;
        }
        *color = BackgroundColor(match interaction {
            Interaction::Pressed => BUTTON_PRESSED_COLOR,
            Interaction::Hovered => BUTTON_HOVER_COLOR,
            Interaction::None => BUTTON_COLOR,
        });
    }
}

/// Pull everything the worker has sent since the last frame.
fn drain_worker_messages(
    channel: Option<ResMut<WorkerChannel>>,
    mut progress: ResMut<InstallProgress>,
) {
    let Some(mut channel) = channel else {
        return;
    };
    while let Ok(message) = channel.receiver.try_recv() {
        match message {
            WorkerMessage::FamilyStarted {
                display_name,
                total,
                ..
            } => {
                progress.total = total;
                progress.current_family = Some(display_name);
            }
            WorkerMessage::FamilyFinished { completed, .. } => {
                progress.completed = completed;
            }
            WorkerMessage::RunFinished(summary) => {
                progress.completed = summary.total;
                progress.current_family = None;
                progress.summary = Some(summary);
                progress.phase = RunPhase::Done;
            }
        }
    }
}

fn update_status_text(
    progress: Res<InstallProgress>,
    mut status: Query<&mut Text, With<StatusText>>,
) {
    if !progress.is_changed() {
        return;
    }
    for mut text in &mut status {
        text.0 = progress.status_line();
    }
}

fn update_progress_fill(
    progress: Res<InstallProgress>,
    mut fill: Query<&mut Node, With<ProgressFill>>,
) {
    if !progress.is_changed() {
        return;
    }
    for mut node in &mut fill {
        node.width = Val::Percent(progress.fraction() * 100.0);
    }
}

/// Spawn the completion overlay exactly once, when the summary arrives.
fn show_summary_panel(
    mut commands: Commands,
    progress: Res<InstallProgress>,
    session: Res<SessionConfig>,
    existing: Query<(), With<SummaryPanel>>,
) {
    if progress.phase != RunPhase::Done || !existing.is_empty() {
        return;
    }
    let Some(summary) = &progress.summary else {
        return;
    };

    let title = if summary.all_succeeded() {
        "Download Complete".to_string()
    } else {
        "Download Complete (with errors)".to_string()
    };
    let mut lines = vec![
        format!("Successfully installed: {} fonts", summary.succeeded),
        format!("Failed to install: {} fonts", summary.failed_count()),
    ];
    if !summary.failed.is_empty() && summary.failed_count() <= MAX_LISTED_FAILURES {
        lines.push("Failed fonts:".to_string());
        for failure in &summary.failed {
            lines.push(format!("  {}", failure.display_name));
        }
    }
    lines.push(format!(
        "Font files saved to: {}",
        session.staging_dir.display()
    ));

    commands
        .spawn((
            SummaryPanel,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(OVERLAY_COLOR),
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(WINDOW_PADDING)),
                        row_gap: Val::Px(6.0),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BackgroundColor(PANEL_COLOR),
                    BorderColor(PANEL_BORDER_COLOR),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new(title),
                        TextFont {
                            font_size: TITLE_FONT_SIZE,
                            ..default()
                        },
                        TextColor(TEXT_PRIMARY),
                    ));
                    for line in lines {
                        let color = if line.starts_with("Failed") || line.starts_with("  ") {
                            TEXT_FAILURE
                        } else {
                            TEXT_SECONDARY
                        };
                        panel.spawn((
                            Text::new(line),
                            TextFont {
                                font_size: SUMMARY_FONT_SIZE,
                                ..default()
                            },
                            TextColor(color),
                        ));
                    }
                });
        });
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
