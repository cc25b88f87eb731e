//! User interface: the progress window and its theme.

pub mod progress;
pub mod theme;

pub use progress::{InstallProgress, ProgressUiPlugin, SessionConfig};
