//! UI colors and layout constants.

use bevy::prelude::*;

// =================================================================
// COLORS
// =================================================================

pub const BACKGROUND_COLOR: Color = Color::srgb(0.12, 0.12, 0.14);
pub const PANEL_COLOR: Color = Color::srgb(0.16, 0.16, 0.19);
pub const PANEL_BORDER_COLOR: Color = Color::srgb(0.30, 0.30, 0.34);

pub const TEXT_PRIMARY: Color = Color::srgb(0.92, 0.92, 0.92);
pub const TEXT_SECONDARY: Color = Color::srgb(0.65, 0.65, 0.68);
pub const TEXT_FAILURE: Color = Color::srgb(0.90, 0.45, 0.40);

pub const PROGRESS_TRACK_COLOR: Color = Color::srgb(0.22, 0.22, 0.26);
pub const PROGRESS_FILL_COLOR: Color = Color::srgb(0.35, 0.65, 0.45);

pub const BUTTON_COLOR: Color = Color::srgb(0.24, 0.24, 0.29);
pub const BUTTON_HOVER_COLOR: Color = Color::srgb(0.30, 0.30, 0.36);
pub const BUTTON_PRESSED_COLOR: Color = Color::srgb(0.20, 0.20, 0.24);
pub const BUTTON_DISABLED_COLOR: Color = Color::srgb(0.18, 0.18, 0.20);

pub const OVERLAY_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);

// =================================================================
// LAYOUT
// =================================================================

pub const WINDOW_PADDING: f32 = 20.0;
pub const ROW_SPACING: f32 = 12.0;

pub const TITLE_FONT_SIZE: f32 = 18.0;
pub const STATUS_FONT_SIZE: f32 = 14.0;
pub const SUMMARY_FONT_SIZE: f32 = 13.0;
pub const BUTTON_FONT_SIZE: f32 = 14.0;

pub const PROGRESS_BAR_HEIGHT: f32 = 14.0;

pub const BUTTON_WIDTH: f32 = 140.0;
pub const BUTTON_HEIGHT: f32 = 34.0;
