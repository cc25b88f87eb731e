//! Platform-specific functionality and error handling.
//!
//! This module provides platform abstractions for initialization,
//! privilege elevation, and fatal error reporting.

use std::path::PathBuf;

/// Outcome of the elevation check at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationStatus {
    /// Running with the privileges needed for a system-wide install.
    Elevated,
    /// A new elevated instance was launched; this process should exit.
    Relaunched,
    /// No elevation available; fonts go to the per-user directory.
    UserScope,
}

/// Initialize platform-specific panic handling.
///
/// Panics are appended to the fallback error log so a crash before the
/// window opens still leaves a trace for the user.
pub fn init_panic_handling() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(error_log_path())
            .map(|mut file| {
                use std::io::Write;
                let _ = writeln!(file, "panic: {panic_info}");
            });
        default_hook(panic_info);
    }));
}

/// Handle application errors with platform-appropriate reporting.
///
/// Prints to stderr, appends to the fallback error log, and exits with
/// code 1.
pub fn handle_error(error: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("Error starting fontgrab:");
    eprintln!("{error}");
    eprintln!();
    eprintln!("Try running with --help for usage information.");

    let _ = std::fs::write(error_log_path(), format!("{error:?}\n"));
    std::process::exit(1);
}

fn error_log_path() -> PathBuf {
    PathBuf::from("fontgrab-error.log")
}

/// Get CLI arguments.
pub fn get_cli_args() -> crate::core::cli::CliArgs {
    use clap::Parser;
    crate::core::cli::CliArgs::parse()
}

/// Check for the privileges a system-wide install needs, relaunching
/// elevated where the platform supports it.
///
/// - Windows: requires administrator rights; a non-admin process starts
///   an elevated copy of itself via the shell and reports `Relaunched`.
///   An error means the relaunch could not even be started.
/// - Unix: root installs system-wide, anyone else degrades to the
///   per-user font directory; nothing is relaunched.
#[cfg(windows)]
pub fn ensure_elevated() -> anyhow::Result<ElevationStatus> {
    use anyhow::bail;
    use windows::core::HSTRING;
    use windows::Win32::UI::Shell::{IsUserAnAdmin, ShellExecuteW};
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    if unsafe { IsUserAnAdmin() }.as_bool() {
        return Ok(ElevationStatus::Elevated);
    }

    let exe = std::env::current_exe()?;
    let instance = unsafe {
        ShellExecuteW(
            None,
            &HSTRING::from("runas"),
            &HSTRING::from(exe.as_os_str()),
            None,
            None,
            SW_SHOWNORMAL,
        )
    };
    // Per the ShellExecute contract, values above 32 signal success.
    if instance.0 as usize > 32 {
        Ok(ElevationStatus::Relaunched)
    } else {
        bail!(
            "administrator privileges are required to install fonts system-wide.\n\
             Please right-click fontgrab and choose \"Run as administrator\"."
        );
    }
}

#[cfg(unix)]
pub fn ensure_elevated() -> anyhow::Result<ElevationStatus> {
    if unsafe { libc::geteuid() } == 0 {
        Ok(ElevationStatus::Elevated)
    } else {
        tracing::info!("not running as root; fonts will be installed for the current user only");
        Ok(ElevationStatus::UserScope)
    }
}
