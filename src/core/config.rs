//! Font catalog configuration.
//!
//! The catalog maps family keys to a display name and an ordered list of
//! candidate source URLs. It is read once at startup from a JSON file;
//! any problem loading it falls back to the built-in set so the tool
//! always has something to install.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One configured font family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontFamily {
    pub display_name: String,
    pub urls: Vec<String>,
}

/// The full catalog. Families keep their declaration order, which is the
/// order they are downloaded and reported in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontCatalog {
    pub fonts: IndexMap<String, FontFamily>,
}

impl FontCatalog {
    /// Load the catalog: explicit `--config` path first, then
    /// `./config.json`, then the built-in set. Read or parse failures
    /// are logged and degrade to the next candidate, never abort.
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = explicit_path
            .map(|path| vec![path.to_owned()])
            .unwrap_or_else(|| vec![PathBuf::from("config.json")]);

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(catalog) => {
                    debug!(path = %path.display(), families = catalog.fonts.len(), "loaded font catalog");
                    return catalog;
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "failed to load font catalog, using built-in set");
                }
            }
        }
        Self::builtin()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let catalog: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(catalog)
    }

    /// Hardcoded fallback catalog, mirroring the shipped `config.json`.
    pub fn builtin() -> Self {
        let mut fonts = IndexMap::new();
        for name in ["Roboto", "Nunito", "Ubuntu"] {
            fonts.insert(
                name.to_owned(),
                FontFamily {
                    display_name: name.to_owned(),
                    urls: vec![
                        format!("https://fonts.googleapis.com/css2?family={name}"),
                        format!("https://fonts.google.com/download?family={name}"),
                    ],
                },
            );
        }
        Self { fonts }
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Families in declaration order.
    pub fn families(&self) -> impl Iterator<Item = (&String, &FontFamily)> {
        self.fonts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_and_preserves_order() {
        let json = r#"{
            "fonts": {
                "Zeta": {"display_name": "Zeta Sans", "urls": ["https://a/z.ttf"]},
                "Alpha": {"display_name": "Alpha", "urls": ["https://a/1", "https://a/2"]}
            }
        }"#;
        let catalog: FontCatalog = serde_json::from_str(json).unwrap();
        let keys: Vec<&String> = catalog.fonts.keys().collect();
        assert_eq!(keys, ["Zeta", "Alpha"]);
        assert_eq!(catalog.fonts["Alpha"].urls.len(), 2);
        assert_eq!(catalog.fonts["Zeta"].display_name, "Zeta Sans");
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let catalog = FontCatalog::load(Some(Path::new("/definitely/not/here.json")));
        assert!(!catalog.is_empty());
        assert!(catalog.fonts.contains_key("Roboto"));
    }

    #[test]
    fn malformed_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let catalog = FontCatalog::load(Some(&path));
        assert!(catalog.fonts.contains_key("Roboto"));
    }

    #[test]
    fn builtin_families_have_ordered_urls() {
        let catalog = FontCatalog::builtin();
        for (_, family) in catalog.families() {
            assert!(!family.urls.is_empty());
        }
    }
}
