//! A font downloader and installer built with Rust and Bevy.

use anyhow::Result;
use fontgrab::core;

/// Run the elevation gate, then the selected application mode.
fn run(cli_args: core::CliArgs) -> Result<()> {
    match core::platform::ensure_elevated()? {
        core::platform::ElevationStatus::Relaunched => {
            println!("Restarting with administrator privileges...");
            return Ok(());
        }
        core::platform::ElevationStatus::Elevated
        | core::platform::ElevationStatus::UserScope => {}
    }
    core::run_app(cli_args)
}

fn main() {
    core::platform::init_panic_handling();
    let cli_args = core::platform::get_cli_args();
    match run(cli_args) {
        Ok(()) => {}
        Err(error) => core::platform::handle_error(error),
    }
}
