//! Application-wide constants.

/// Window title shown in the title bar.
pub const WINDOW_TITLE: &str = "Fontgrab";

/// Fixed window size; the layout is not designed to reflow.
pub const DEFAULT_WINDOW_SIZE: (f32, f32) = (420.0, 240.0);

/// Directory (relative to the working directory) where downloaded font
/// files are staged before installation.
pub const STAGING_DIR_NAME: &str = "downloaded_fonts";

/// Connect timeout for a single HTTP request, in seconds.
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Total timeout for a single HTTP request, in seconds.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How long the font-change broadcast may block before falling back, in
/// milliseconds.
pub const FONT_CHANGE_BROADCAST_TIMEOUT_MS: u32 = 1000;

/// Failed family names are listed in the summary only when there are at
/// most this many of them.
pub const MAX_LISTED_FAILURES: usize = 5;
