//! Font installation.
//!
//! Installation is four steps: copy into the platform font directory,
//! load the font resource for the running session, persist a durable
//! record so it survives a reboot, and tell running applications that the
//! font set changed. The platform-specific calls live behind
//! [`FontRegistrar`]; everything here is platform-neutral.

#[cfg(unix)]
pub mod fontconfig;
#[cfg(windows)]
pub mod windows;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::acquire::StagedFontFile;

/// Platform capability for making a font file visible system-wide.
///
/// One implementation per target: Windows talks to GDI and the registry,
/// Unix leans on the fontconfig directory convention. Tests use a
/// recording stand-in.
pub trait FontRegistrar: Send + Sync {
    /// Directory installed font files are copied into.
    fn font_dir(&self) -> PathBuf;

    /// Make the font at `path` available to the current session.
    /// `Ok(true)` means the platform accepted it.
    fn load_font_resource(&self, path: &Path) -> Result<bool>;

    /// Persist a record mapping `record_name` to `file_name` so the
    /// installation survives a restart.
    fn write_durable_record(&self, record_name: &str, file_name: &str) -> Result<()>;

    /// Tell running applications the font set changed. Best effort.
    fn broadcast_font_change(&self);
}

/// Pick the registrar for the compile target.
#[cfg(windows)]
pub fn platform_registrar() -> Arc<dyn FontRegistrar> {
    Arc::new(windows::WindowsRegistrar::new())
}

#[cfg(unix)]
pub fn platform_registrar() -> Arc<dyn FontRegistrar> {
    Arc::new(fontconfig::FontconfigRegistrar::new())
}

/// Registry record name for a font file: the stem plus a type label,
/// `Roboto-Bold.ttf` -> `Roboto-Bold (TrueType)`.
pub fn durable_record_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_owned());
    let label = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("otf") => "(OpenType)",
        // .ttf, and anything unexpected, is labeled TrueType.
        _ => "(TrueType)",
    };
    format!("{stem} {label}")
}

pub struct Installer {
    registrar: Arc<dyn FontRegistrar>,
}

impl Installer {
    pub fn new(registrar: Arc<dyn FontRegistrar>) -> Self {
        Self { registrar }
    }

    /// Install one staged font file. Returns true only when the platform
    /// reported a positive load; every step is independently tolerant of
    /// failure so a broken copy never blocks the broadcast, and a broken
    /// record write never undoes a successful load.
    pub fn install(&self, staged: &StagedFontFile) -> bool {
        let file_name = staged.file_name();
        let destination = self.registrar.font_dir().join(&file_name);

        // Step 1: copy, unless a file of the same name is already there.
        // Presence by name alone counts as installed; contents are never
        // compared.
        if destination.exists() {
            debug!(file = file_name, "already present in font directory, not overwriting");
        } else if let Err(error) = fs::copy(&staged.path, &destination) {
            warn!(file = file_name, %error, "failed to copy font into font directory");
        }

        // Step 2: session load. Only this result decides success.
        let loaded = match self.registrar.load_font_resource(&destination) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(file = file_name, %error, "font resource load failed");
                false
            }
        };

        // Step 3: durable record, only for fonts the session accepted.
        // A record write the platform refuses (typically permissions) is
        // deliberately swallowed; the font stays usable until reboot.
        if loaded {
            let record_name = durable_record_name(&file_name);
            match self.registrar.write_durable_record(&record_name, &file_name) {
                Ok(()) => info!(record = record_name, "registered font"),
                Err(error) => {
                    debug!(record = record_name, %error, "durable record not written");
                }
            }
        }

        // Step 4: nudge running applications.
        self.registrar.broadcast_font_change();

        loaded
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use anyhow::{bail, Result};

    use super::FontRegistrar;

    /// Recording registrar with a temp font directory and injectable
    /// failures.
    pub struct RecordingRegistrar {
        font_dir: tempfile::TempDir,
        pub records: Mutex<Vec<(String, String)>>,
        pub broadcasts: AtomicUsize,
        pub fail_load: bool,
        pub fail_record: bool,
    }

    impl RecordingRegistrar {
        pub fn new() -> Self {
            Self {
                font_dir: tempfile::tempdir().expect("temp font dir"),
                records: Mutex::new(Vec::new()),
                broadcasts: AtomicUsize::new(0),
                fail_load: false,
                fail_record: false,
            }
        }

        pub fn failing_record_writes() -> Self {
            Self {
                fail_record: true,
                ..Self::new()
            }
        }

        pub fn failing_loads() -> Self {
            Self {
                fail_load: true,
                ..Self::new()
            }
        }

        pub fn recorded(&self) -> Vec<(String, String)> {
            self.records.lock().expect("records poisoned").clone()
        }
    }

    impl FontRegistrar for RecordingRegistrar {
        fn font_dir(&self) -> PathBuf {
            self.font_dir.path().to_owned()
        }

        fn load_font_resource(&self, path: &Path) -> Result<bool> {
            if self.fail_load {
                bail!("simulated load failure");
            }
            Ok(path.exists())
        }

        fn write_durable_record(&self, record_name: &str, file_name: &str) -> Result<()> {
            if self.fail_record {
                bail!("simulated permission denied");
            }
            self.records
                .lock()
                .expect("records poisoned")
                .push((record_name.to_owned(), file_name.to_owned()));
            Ok(())
        }

        fn broadcast_font_change(&self) {
            self.broadcasts.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::test_support::RecordingRegistrar;
    use super::*;
    use crate::acquire::{FontKind, StagedFontFile};

    fn staged_file(dir: &Path, name: &str, contents: &[u8]) -> StagedFontFile {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        StagedFontFile {
            path,
            kind: FontKind::from_file_name(name),
        }
    }

    #[test]
    fn record_name_derivation() {
        assert_eq!(durable_record_name("Roboto-Bold.ttf"), "Roboto-Bold (TrueType)");
        assert_eq!(durable_record_name("Nunito.otf"), "Nunito (OpenType)");
        assert_eq!(durable_record_name("Odd.fnt"), "Odd (TrueType)");
    }

    #[test]
    fn install_copies_loads_records_and_broadcasts() {
        let staging = tempfile::tempdir().unwrap();
        let registrar = Arc::new(RecordingRegistrar::new());
        let installer = Installer::new(registrar.clone());

        let staged = staged_file(staging.path(), "Fam_A.ttf", b"glyphs");
        assert!(installer.install(&staged));

        assert!(registrar.font_dir().join("Fam_A.ttf").exists());
        assert_eq!(
            registrar.recorded(),
            [("Fam_A (TrueType)".to_owned(), "Fam_A.ttf".to_owned())]
        );
        assert_eq!(registrar.broadcasts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_install_of_same_name_does_not_overwrite() {
        let staging = tempfile::tempdir().unwrap();
        let registrar = Arc::new(RecordingRegistrar::new());
        let installer = Installer::new(registrar.clone());

        let first = staged_file(staging.path(), "Dup.ttf", b"original");
        assert!(installer.install(&first));

        let second = staged_file(staging.path(), "Dup.ttf", b"replacement");
        assert!(installer.install(&second));

        let installed = fs::read(registrar.font_dir().join("Dup.ttf")).unwrap();
        assert_eq!(installed, b"original");
        assert_eq!(fs::read_dir(registrar.font_dir()).unwrap().count(), 1);
    }

    #[test]
    fn durable_record_failure_still_counts() {
        // A font that loaded but could not be recorded stays "installed"
        // for this run even though it will not survive a reboot.
        let staging = tempfile::tempdir().unwrap();
        let registrar = Arc::new(RecordingRegistrar::failing_record_writes());
        let installer = Installer::new(registrar.clone());

        let staged = staged_file(staging.path(), "Fleeting.otf", b"glyphs");
        assert!(installer.install(&staged));
        assert!(registrar.recorded().is_empty());
    }

    #[test]
    fn failed_load_reports_failure_but_still_broadcasts() {
        let staging = tempfile::tempdir().unwrap();
        let registrar = Arc::new(RecordingRegistrar::failing_loads());
        let installer = Installer::new(registrar.clone());

        let staged = staged_file(staging.path(), "Broken.ttf", b"glyphs");
        assert!(!installer.install(&staged));
        assert!(registrar.recorded().is_empty());
        assert_eq!(registrar.broadcasts.load(Ordering::SeqCst), 1);
    }
}
