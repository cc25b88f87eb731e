//! Command line interface for fontgrab
//!
//! Handles parsing command line arguments and provides
//! validation for user inputs.

use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

/// Fontgrab CLI arguments
///
/// Examples:
///   fontgrab                                # Download and install the configured fonts
///   fontgrab --config my-fonts.json        # Use a custom font catalog
///   fontgrab --headless                    # Run without a window, print the summary
///   fontgrab --install-existing            # Install fonts already in downloaded_fonts/
#[derive(Parser, Debug, Resource, Clone)]
#[clap(
    name = "fontgrab",
    version,
    about = "Download font families and install them system-wide",
    long_about = "Fontgrab downloads a configured set of font families from the web, extracts font files from stylesheets and archives, and installs them into the operating system's font directory so they become available to every application."
)]
pub struct CliArgs {
    /// Path to a font catalog file
    ///
    /// A JSON document mapping family keys to a display name and an
    /// ordered list of source URLs. Defaults to ./config.json, falling
    /// back to the built-in catalog when no file can be loaded.
    #[clap(
        long = "config",
        short = 'c',
        help = "Font catalog to use (JSON)",
        long_help = "Path to a JSON font catalog: {\"fonts\": {key: {\"display_name\": ..., \"urls\": [...]}}}. If not specified, ./config.json is tried, then the built-in catalog."
    )]
    pub config: Option<PathBuf>,

    /// Directory where downloaded fonts are staged
    ///
    /// Created if it does not exist. Defaults to ./downloaded_fonts.
    #[clap(
        long = "staging-dir",
        help = "Staging directory for downloaded fonts",
        long_help = "Directory where downloaded font files are kept before and after installation. Created if absent. Defaults to ./downloaded_fonts in the working directory."
    )]
    pub staging_dir: Option<PathBuf>,

    /// Run without a window
    ///
    /// Performs the full download-and-install run on the console and
    /// prints the summary instead of opening the progress window.
    #[clap(
        long = "headless",
        help = "Run without a window and print the summary",
        long_help = "Run the complete download-and-install pass without opening a window. Progress and the final summary are written to the console and the log file. Useful for scripts and remote sessions."
    )]
    pub headless: bool,

    /// Install fonts already present in the staging directory
    ///
    /// Skips all downloads and installs every .ttf/.otf file found in
    /// the staging directory. Implies --headless.
    #[clap(
        long = "install-existing",
        help = "Install already-downloaded fonts, skipping downloads",
        long_help = "Skip the download step entirely and install every .ttf/.otf file already present in the staging directory. Runs on the console and implies --headless."
    )]
    pub install_existing: bool,
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    ///
    /// Ensures paths the user pointed at actually exist before the
    /// application starts, with clear messages for common mistakes.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.config {
            if !path.exists() {
                return Err(format!(
                    "Font catalog does not exist: {}\nMake sure the path is correct and the file exists.",
                    path.display()
                ));
            }
            if !path.is_file() {
                return Err(format!("Font catalog is not a file: {}", path.display()));
            }
        }

        if self.install_existing {
            let staging = self.staging_dir();
            if !staging.exists() {
                return Err(format!(
                    "No staging directory to install from: {}\nRun a download first, or pass --staging-dir.",
                    staging.display()
                ));
            }
        }

        Ok(())
    }

    /// Staging directory from CLI args or the default
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::core::settings::STAGING_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_staging_dir() {
        let args = CliArgs::parse_from(["fontgrab"]);
        assert_eq!(args.staging_dir(), PathBuf::from("downloaded_fonts"));
        assert!(!args.headless);
    }

    #[test]
    fn missing_config_fails_validation() {
        let args = CliArgs::parse_from(["fontgrab", "--config", "/no/such/catalog.json"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn install_existing_requires_a_staging_dir() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staged");
        let args = CliArgs::parse_from([
            "fontgrab",
            "--install-existing",
            "--staging-dir",
            staging.to_str().unwrap(),
        ]);
        assert!(args.validate().is_err());

        std::fs::create_dir_all(&staging).unwrap();
        assert!(args.validate().is_ok());
    }
}
