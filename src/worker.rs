//! The background worker.
//!
//! One thread walks the catalog sequentially: families in declaration
//! order, each family's URLs in order, each staged file installed before
//! the next is considered. Progress goes to the UI over an unbounded
//! channel as fire-and-forget messages; the final summary travels in the
//! completion message rather than through shared state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use crate::acquire::{Acquirer, FontKind, StagedFontFile};
use crate::core::config::{FontCatalog, FontFamily};
use crate::install::{platform_registrar, Installer};
use crate::net::{Fetch, HttpFetcher};

/// Progress messages sent from the worker to the presentation layer.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    FamilyStarted {
        display_name: String,
        index: usize,
        total: usize,
    },
    FamilyFinished {
        display_name: String,
        completed: usize,
        succeeded: bool,
    },
    RunFinished(RunSummary),
}

/// A family that could not be installed, with the last error seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFamily {
    pub display_name: String,
    pub error: String,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedFamily>,
}

impl RunSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Install one family: walk its URLs in order and stop at the first that
/// yields at least one installed ttf/otf file.
///
/// Returns the number of installed files on success; the error carries
/// the last failure once every URL is exhausted.
pub fn install_family(
    acquirer: &Acquirer,
    installer: &Installer,
    family: &FontFamily,
) -> Result<usize> {
    let mut last_error = anyhow!("no source URLs configured");

    for url in &family.urls {
        info!(family = %family.display_name, %url, "trying source URL");
        let staged = match acquirer.stage_from_url(&family.display_name, url) {
            Ok(staged) => staged,
            Err(error) => {
                warn!(family = %family.display_name, %url, %error, "source URL failed");
                last_error = error;
                continue;
            }
        };

        if staged.is_empty() {
            last_error = anyhow!("{url} yielded no font files");
            continue;
        }

        let installed = staged
            .iter()
            .filter(|file| file.kind.installable())
            .filter(|file| installer.install(file))
            .count();

        // A URL only counts when something actually got installed;
        // woff-only stylesheets keep the loop going.
        if installed > 0 {
            return Ok(installed);
        }
        last_error = anyhow!("no font files from {url} could be installed");
    }

    Err(last_error)
}

/// Run the whole catalog. `notify` receives progress messages; sending
/// is fire-and-forget so a departed listener never stops the run.
pub fn run_catalog(
    catalog: &FontCatalog,
    acquirer: &Acquirer,
    installer: &Installer,
    notify: impl Fn(WorkerMessage),
) -> RunSummary {
    let total = catalog.len();
    let mut summary = RunSummary {
        total,
        ..RunSummary::default()
    };

    for (index, (_key, family)) in catalog.families().enumerate() {
        notify(WorkerMessage::FamilyStarted {
            display_name: family.display_name.clone(),
            index,
            total,
        });

        let succeeded = match install_family(acquirer, installer, family) {
            Ok(installed) => {
                info!(family = %family.display_name, installed, "family installed");
                summary.succeeded += 1;
                true
            }
            Err(error) => {
                error!(family = %family.display_name, %error, "every source URL failed");
                summary.failed.push(FailedFamily {
                    display_name: family.display_name.clone(),
                    error: error.to_string(),
                });
                false
            }
        };

        notify(WorkerMessage::FamilyFinished {
            display_name: family.display_name.clone(),
            completed: index + 1,
            succeeded,
        });
    }

    notify(WorkerMessage::RunFinished(summary.clone()));
    summary
}

/// Spawn the worker thread for a GUI run. All network and filesystem
/// work happens on this thread; the UI only ever drains the channel.
pub fn spawn(
    catalog: FontCatalog,
    staging_dir: PathBuf,
    sender: UnboundedSender<WorkerMessage>,
) -> JoinHandle<RunSummary> {
    std::thread::spawn(move || {
        let fetcher: Arc<dyn Fetch> = match HttpFetcher::new() {
            Ok(fetcher) => Arc::new(fetcher),
            Err(error) => {
                error!(%error, "could not build HTTP client");
                let summary = RunSummary {
                    total: catalog.len(),
                    succeeded: 0,
                    failed: catalog
                        .families()
                        .map(|(_, family)| FailedFamily {
                            display_name: family.display_name.clone(),
                            error: error.to_string(),
                        })
                        .collect(),
                };
                let _ = sender.send(WorkerMessage::RunFinished(summary.clone()));
                return summary;
            }
        };
        let acquirer = Acquirer::new(fetcher, staging_dir);
        let installer = Installer::new(platform_registrar());
        run_catalog(&catalog, &acquirer, &installer, |message| {
            let _ = sender.send(message);
        })
    })
}

/// Install fonts already sitting in the staging directory, skipping the
/// download step entirely.
pub fn install_existing(staging_dir: &Path, installer: &Installer) -> RunSummary {
    let mut summary = RunSummary::default();

    let entries = match std::fs::read_dir(staging_dir) {
        Ok(entries) => entries,
        Err(error) => {
            error!(dir = %staging_dir.display(), %error, "no staging directory to install from");
            return summary;
        }
    };

    let mut fonts: Vec<StagedFontFile> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let kind = match path.extension()?.to_str()?.to_lowercase().as_str() {
                "ttf" => FontKind::Ttf,
                "otf" => FontKind::Otf,
                _ => return None,
            };
            Some(StagedFontFile { path, kind })
        })
        .collect();
    fonts.sort_by_key(|file| file.file_name());

    summary.total = fonts.len();
    for font in &fonts {
        if installer.install(font) {
            summary.succeeded += 1;
        } else {
            summary.failed.push(FailedFamily {
                display_name: font.file_name(),
                error: "font resource load failed".to_owned(),
            });
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::acquire::archive::tests::build_zip;
    use crate::core::config::FontFamily;
    use crate::install::test_support::RecordingRegistrar;
    use crate::install::FontRegistrar;
    use crate::net::test_support::FakeFetcher;
    use indexmap::IndexMap;

    fn catalog_of(families: Vec<(&str, FontFamily)>) -> FontCatalog {
        let mut fonts = IndexMap::new();
        for (key, family) in families {
            fonts.insert(key.to_owned(), family);
        }
        FontCatalog { fonts }
    }

    fn family(display_name: &str, urls: &[&str]) -> FontFamily {
        FontFamily {
            display_name: display_name.to_owned(),
            urls: urls.iter().map(|url| (*url).to_owned()).collect(),
        }
    }

    #[test]
    fn first_successful_url_stops_the_loop() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .insert("https://a/one.ttf", None, b"font".to_vec())
                .insert("https://a/two.ttf", None, b"font".to_vec()),
        );
        let staging = tempfile::tempdir().unwrap();
        let acquirer = Acquirer::new(fetcher.clone(), staging.path());
        let installer = Installer::new(Arc::new(RecordingRegistrar::new()));

        let fam = family("Fam", &["https://a/one.ttf", "https://a/two.ttf"]);
        assert_eq!(install_family(&acquirer, &installer, &fam).unwrap(), 1);
        assert_eq!(fetcher.request_log(), ["https://a/one.ttf"]);
    }

    #[test]
    fn exhausted_urls_report_the_last_error() {
        let staging = tempfile::tempdir().unwrap();
        let acquirer = Acquirer::new(Arc::new(FakeFetcher::new()), staging.path());
        let installer = Installer::new(Arc::new(RecordingRegistrar::new()));

        let fam = family("Gone", &["https://a/x.ttf", "https://a/y.ttf"]);
        let error = install_family(&acquirer, &installer, &fam).unwrap_err();
        assert!(error.to_string().contains("y.ttf"));
    }

    #[test]
    fn woff_only_stylesheet_does_not_count_as_success() {
        let css = "@font-face { src: url(https://a/web.woff2); }";
        let fetcher = Arc::new(
            FakeFetcher::new()
                .insert("https://a/css", Some("text/css"), css.as_bytes().to_vec())
                .insert("https://a/web.woff2", None, b"w".to_vec()),
        );
        let staging = tempfile::tempdir().unwrap();
        let acquirer = Acquirer::new(fetcher, staging.path());
        let installer = Installer::new(Arc::new(RecordingRegistrar::new()));

        let fam = family("WebOnly", &["https://a/css"]);
        assert!(install_family(&acquirer, &installer, &fam).is_err());
        // Staged for the user even though nothing was installable.
        assert!(staging.path().join("WebOnly.woff2").exists());
    }

    #[test]
    fn run_tallies_successes_and_failures() {
        let fetcher = Arc::new(
            FakeFetcher::new().insert("https://a/good.ttf", None, b"font".to_vec()),
        );
        let staging = tempfile::tempdir().unwrap();
        let acquirer = Acquirer::new(fetcher, staging.path());
        let installer = Installer::new(Arc::new(RecordingRegistrar::new()));

        let catalog = catalog_of(vec![
            ("Good", family("Good", &["https://a/good.ttf"])),
            ("Bad", family("Bad", &["https://a/bad.ttf"])),
        ]);

        let messages = Mutex::new(Vec::new());
        let summary = run_catalog(&catalog, &acquirer, &installer, |message| {
            messages.lock().unwrap().push(message);
        });

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failed[0].display_name, "Bad");

        let messages = messages.lock().unwrap();
        // started/finished per family plus the final summary.
        assert_eq!(messages.len(), 5);
        assert!(matches!(
            messages.last(),
            Some(WorkerMessage::RunFinished(s)) if s.succeeded == 1
        ));
        assert!(matches!(
            &messages[1],
            WorkerMessage::FamilyFinished { completed: 1, succeeded: true, .. }
        ));
    }

    #[test]
    fn zip_end_to_end_installs_both_fonts() {
        let zip = build_zip(&[("A.ttf", b"a" as &[u8]), ("B.otf", b"b")]);
        let fetcher = Arc::new(FakeFetcher::new().insert("https://a/family.zip", None, zip));
        let staging = tempfile::tempdir().unwrap();
        let acquirer = Acquirer::new(fetcher, staging.path());
        let registrar = Arc::new(RecordingRegistrar::new());
        let installer = Installer::new(registrar.clone());

        let catalog = catalog_of(vec![(
            "Pack",
            family("Pack Family", &["https://a/family.zip"]),
        )]);
        let summary = run_catalog(&catalog, &acquirer, &installer, |_| {});

        assert_eq!(summary.succeeded, 1);
        assert!(summary.all_succeeded());
        assert!(staging.path().join("Pack_Family_A.ttf").exists());
        assert!(staging.path().join("Pack_Family_B.otf").exists());
        assert!(registrar.font_dir().join("Pack_Family_A.ttf").exists());
        assert!(registrar.font_dir().join("Pack_Family_B.otf").exists());
    }

    #[test]
    fn install_existing_scans_only_installable_files() {
        let staging = tempfile::tempdir().unwrap();
        std::fs::write(staging.path().join("A.ttf"), b"a").unwrap();
        std::fs::write(staging.path().join("B.otf"), b"b").unwrap();
        std::fs::write(staging.path().join("C.woff2"), b"c").unwrap();
        std::fs::write(staging.path().join("notes.txt"), b"n").unwrap();

        let registrar = Arc::new(RecordingRegistrar::new());
        let installer = Installer::new(registrar.clone());
        let summary = install_existing(staging.path(), &installer);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert!(registrar.font_dir().join("A.ttf").exists());
        assert!(!registrar.font_dir().join("C.woff2").exists());
    }
}
