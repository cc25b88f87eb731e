//! Fontconfig-convention registrar for Unix-like systems.
//!
//! There is no Unix equivalent of the Windows font registry: fontconfig
//! discovers fonts by scanning well-known directories. So "loading" a
//! font means verifying the copy landed, the durable record is a small
//! manifest kept next to the fonts, and the change broadcast is a
//! bounded `fc-cache` invocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::settings::FONT_CHANGE_BROADCAST_TIMEOUT_MS;

/// Manifest file recording installed fonts, kept in the font directory.
const MANIFEST_NAME: &str = "installed.json";

pub struct FontconfigRegistrar {
    font_dir: PathBuf,
}

impl FontconfigRegistrar {
    pub fn new() -> Self {
        Self {
            font_dir: default_font_dir(),
        }
    }

    #[cfg(test)]
    pub fn with_font_dir(font_dir: impl Into<PathBuf>) -> Self {
        Self {
            font_dir: font_dir.into(),
        }
    }

    fn manifest_path(&self) -> PathBuf {
        self.font_dir.join(MANIFEST_NAME)
    }
}

impl Default for FontconfigRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

/// Root installs system-wide; everyone else gets the per-user directory
/// fontconfig already scans.
fn default_font_dir() -> PathBuf {
    let is_root = unsafe { libc::geteuid() } == 0;
    if is_root {
        PathBuf::from("/usr/local/share/fonts/fontgrab")
    } else {
        dirs::font_dir()
            .unwrap_or_else(|| PathBuf::from(".").join("fonts"))
            .join("fontgrab")
    }
}

impl super::FontRegistrar for FontconfigRegistrar {
    fn font_dir(&self) -> PathBuf {
        if let Err(error) = fs::create_dir_all(&self.font_dir) {
            warn!(dir = %self.font_dir.display(), %error, "could not create font directory");
        }
        self.font_dir.clone()
    }

    fn load_font_resource(&self, path: &Path) -> Result<bool> {
        // Fontconfig picks fonts up by directory scan; a present,
        // non-empty file is as "loaded" as this platform gets.
        let metadata = fs::metadata(path)
            .with_context(|| format!("installed font missing: {}", path.display()))?;
        Ok(metadata.is_file() && metadata.len() > 0)
    }

    fn write_durable_record(&self, record_name: &str, file_name: &str) -> Result<()> {
        let manifest_path = self.manifest_path();
        let mut manifest: Map<String, Value> = match fs::read_to_string(&manifest_path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Map::new(),
        };
        manifest.insert(record_name.to_owned(), Value::String(file_name.to_owned()));
        let contents = serde_json::to_string_pretty(&Value::Object(manifest))?;
        fs::write(&manifest_path, contents)
            .with_context(|| format!("failed to write {}", manifest_path.display()))?;
        Ok(())
    }

    fn broadcast_font_change(&self) {
        // Refresh the fontconfig cache for our directory. Bounded wait,
        // then detach rather than hold up the install loop.
        let child = Command::new("fc-cache").arg("-f").arg(&self.font_dir).spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(error) => {
                debug!(%error, "fc-cache unavailable; relying on periodic cache refresh");
                return;
            }
        };

        let deadline =
            Instant::now() + Duration::from_millis(u64::from(FONT_CHANGE_BROADCAST_TIMEOUT_MS));
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "fc-cache finished");
                    return;
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(50));
                }
                Ok(None) => {
                    debug!("fc-cache still running; leaving it to finish in the background");
                    return;
                }
                Err(error) => {
                    debug!(%error, "could not wait for fc-cache");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::FontRegistrar;
    use super::*;

    #[test]
    fn manifest_accumulates_records() {
        let dir = tempfile::tempdir().unwrap();
        let registrar = FontconfigRegistrar::with_font_dir(dir.path());

        registrar
            .write_durable_record("A (TrueType)", "A.ttf")
            .unwrap();
        registrar
            .write_durable_record("B (OpenType)", "B.otf")
            .unwrap();

        let manifest: Map<String, Value> = serde_json::from_str(
            &fs::read_to_string(dir.path().join(MANIFEST_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest["A (TrueType)"], "A.ttf");
    }

    #[test]
    fn load_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let registrar = FontconfigRegistrar::with_font_dir(dir.path());

        let font = dir.path().join("X.ttf");
        fs::write(&font, b"glyphs").unwrap();
        assert!(registrar.load_font_resource(&font).unwrap());

        let empty = dir.path().join("empty.ttf");
        fs::write(&empty, b"").unwrap();
        assert!(!registrar.load_font_resource(&empty).unwrap());

        assert!(registrar
            .load_font_resource(&dir.path().join("missing.ttf"))
            .is_err());
    }
}
