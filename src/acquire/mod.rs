//! Font acquisition.
//!
//! The acquirer turns one source URL into zero or more staged font files.
//! Three payload shapes are recognized: a stylesheet that references the
//! real font files, a ZIP archive of font files, and a raw font file.
//! Anything else stages nothing so the caller can move on to the next
//! candidate URL.

pub mod archive;
pub mod stylesheet;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::net::Fetch;

/// File type of a staged font, inferred from its source URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    Ttf,
    Otf,
    Woff,
    Woff2,
}

impl FontKind {
    pub fn extension(self) -> &'static str {
        match self {
            FontKind::Ttf => ".ttf",
            FontKind::Otf => ".otf",
            FontKind::Woff => ".woff",
            FontKind::Woff2 => ".woff2",
        }
    }

    /// Only TrueType and OpenType files go through the installer; web
    /// font formats are staged for the user but never registered.
    pub fn installable(self) -> bool {
        matches!(self, FontKind::Ttf | FontKind::Otf)
    }

    pub fn from_file_name(name: &str) -> Self {
        stylesheet::infer_kind(name)
    }
}

/// A font file sitting in the staging directory, ready for installation.
#[derive(Debug, Clone)]
pub struct StagedFontFile {
    pub path: PathBuf,
    pub kind: FontKind,
}

impl StagedFontFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Display names become filename prefixes; spaces would be awkward there.
fn sanitize_display_name(display_name: &str) -> String {
    display_name.replace(' ', "_")
}

pub struct Acquirer {
    fetcher: Arc<dyn Fetch>,
    staging_dir: PathBuf,
    scratch_root: Option<PathBuf>,
}

impl Acquirer {
    pub fn new(fetcher: Arc<dyn Fetch>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            staging_dir: staging_dir.into(),
            scratch_root: None,
        }
    }

    /// Root directory for archive-extraction temporaries. Defaults to the
    /// system temp dir; tests point it somewhere they can inspect.
    pub fn with_scratch_root(mut self, scratch_root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(scratch_root.into());
        self
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Fetch one source URL and stage whatever font files it yields.
    ///
    /// An empty result is not an error: it means the URL was reachable
    /// but produced nothing installable (for instance a stylesheet with
    /// no font sources, or an unrecognized payload).
    pub fn stage_from_url(&self, display_name: &str, url: &str) -> Result<Vec<StagedFontFile>> {
        fs::create_dir_all(&self.staging_dir).with_context(|| {
            format!(
                "failed to create staging directory {}",
                self.staging_dir.display()
            )
        })?;

        if stylesheet::is_stylesheet_url(url) {
            return self.stage_from_stylesheet(display_name, url);
        }

        let body = self.fetcher.get(url)?;
        if archive::looks_like_zip(&body.bytes, body.content_type.as_deref()) {
            debug!(url, "payload looks like a ZIP archive");
            return self.stage_from_archive(display_name, &body.bytes);
        }

        let kind = stylesheet::infer_kind(url);
        if kind.installable() && url.to_lowercase().ends_with(kind.extension()) {
            debug!(url, "payload is a raw font file");
            let file_name = format!("{}{}", sanitize_display_name(display_name), kind.extension());
            let staged = self.write_staged(&file_name, &body.bytes, kind)?;
            return Ok(vec![staged]);
        }

        warn!(url, "unrecognized payload; skipping this source");
        Ok(Vec::new())
    }

    fn stage_from_stylesheet(&self, display_name: &str, url: &str) -> Result<Vec<StagedFontFile>> {
        let css = self.fetcher.get(url)?.text();
        let font_urls = stylesheet::extract_font_urls(&css);
        if font_urls.is_empty() {
            debug!(url, "stylesheet contained no font sources");
            return Ok(Vec::new());
        }

        let prefix = sanitize_display_name(display_name);
        let mut staged = Vec::new();
        for (index, font_url) in font_urls.iter().enumerate() {
            let kind = stylesheet::infer_kind(font_url);
            // A lone resource keeps the bare display name; several get a
            // variant suffix so they don't clobber each other.
            let file_name = if font_urls.len() > 1 {
                format!("{}_variant_{}{}", prefix, index + 1, kind.extension())
            } else {
                format!("{}{}", prefix, kind.extension())
            };

            match self.fetcher.get(font_url) {
                Ok(body) => {
                    let file = self.write_staged(&file_name, &body.bytes, kind)?;
                    info!(file = %file.file_name(), bytes = body.bytes.len(), "staged font resource");
                    staged.push(file);
                }
                Err(error) => {
                    warn!(url = %font_url, %error, "failed to download font resource");
                }
            }
        }
        Ok(staged)
    }

    fn stage_from_archive(&self, display_name: &str, bytes: &[u8]) -> Result<Vec<StagedFontFile>> {
        let scratch_root = match &self.scratch_root {
            Some(root) => root.clone(),
            None => std::env::temp_dir(),
        };
        let (extract_dir, font_paths) = archive::unpack_fonts(bytes, &scratch_root)?;

        let prefix = sanitize_display_name(display_name);
        let mut staged = Vec::new();
        for font_path in font_paths {
            let original_name = font_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file_name = format!("{prefix}_{original_name}");
            let destination = self.staging_dir.join(&file_name);
            fs::copy(&font_path, &destination)
                .with_context(|| format!("failed to stage {original_name}"))?;
            info!(file = %file_name, "staged font from archive");
            staged.push(StagedFontFile {
                path: destination,
                kind: FontKind::from_file_name(&file_name),
            });
        }
        drop(extract_dir);
        Ok(staged)
    }

    fn write_staged(&self, file_name: &str, bytes: &[u8], kind: FontKind) -> Result<StagedFontFile> {
        let path = self.staging_dir.join(file_name);
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(StagedFontFile { path, kind })
    }
}
