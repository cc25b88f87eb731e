//! Stylesheet handling.
//!
//! Font hosting services commonly answer with a CSS document whose
//! `@font-face` rules point at the real font files. The only part of
//! those documents we care about is the `src: url(...)` value.

use std::sync::OnceLock;

use regex::Regex;

use super::FontKind;

fn src_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"src:\s*url\(([^)]+)\)").expect("valid regex literal"))
}

/// Whether a source URL should be treated as a stylesheet endpoint.
///
/// Matches the configuration convention: stylesheet sources carry `css`
/// somewhere in the URL (`/css2?family=...`, `.css`, ...).
pub fn is_stylesheet_url(url: &str) -> bool {
    url.contains("css")
}

/// Extract font-resource URLs from a CSS document.
///
/// URLs are unquoted and filtered down to ones whose suffix looks like a
/// font file; anything else (SVG sources, data URIs) is dropped.
pub fn extract_font_urls(css: &str) -> Vec<String> {
    src_url_pattern()
        .captures_iter(css)
        .map(|captures| captures[1].trim_matches(&['\'', '"'][..]).to_owned())
        .filter(|url| {
            let lower = url.to_lowercase();
            [".ttf", ".otf", ".woff2", ".woff"]
                .iter()
                .any(|ext| lower.contains(ext))
        })
        .collect()
}

/// Infer the font file kind from a resource URL.
///
/// Suffixes are checked in a fixed order; `.woff2` must come before
/// `.woff` since the latter is a prefix of the former. Unknown suffixes
/// fall back to TrueType.
pub fn infer_kind(url: &str) -> FontKind {
    let lower = url.to_lowercase();
    if lower.contains(".ttf") {
        FontKind::Ttf
    } else if lower.contains(".otf") {
        FontKind::Otf
    } else if lower.contains(".woff2") {
        FontKind::Woff2
    } else if lower.contains(".woff") {
        FontKind::Woff
    } else {
        FontKind::Ttf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSS: &str = r#"
        /* latin */
        @font-face {
          font-family: 'Roboto';
          font-style: normal;
          font-weight: 400;
          src: url(https://fonts.gstatic.com/s/roboto/v30/KFOmCnqEu92Fr1Mu4mxK.woff2) format('woff2');
        }
        @font-face {
          font-family: 'Roboto';
          font-style: italic;
          src: url('https://fonts.gstatic.com/s/roboto/v30/KFOkCnqEu92Fr1Mu51xIIzI.ttf') format('truetype');
        }
    "#;

    #[test]
    fn extracts_all_font_urls() {
        let urls = extract_font_urls(SAMPLE_CSS);
        assert_eq!(urls.len(), 2);
        assert!(urls[0].ends_with(".woff2"));
        assert!(urls[1].ends_with(".ttf"));
    }

    #[test]
    fn strips_surrounding_quotes() {
        let urls = extract_font_urls(SAMPLE_CSS);
        assert!(!urls[1].contains('\''));
    }

    #[test]
    fn ignores_non_font_sources() {
        let css = "src: url(image.svg); src: url(data.bin);";
        assert!(extract_font_urls(css).is_empty());
    }

    #[test]
    fn kind_inference_order() {
        assert_eq!(infer_kind("https://x/a.ttf"), FontKind::Ttf);
        assert_eq!(infer_kind("https://x/a.otf?v=1"), FontKind::Otf);
        // ".woff" is a substring of ".woff2"; the longer suffix wins.
        assert_eq!(infer_kind("https://x/a.woff2"), FontKind::Woff2);
        assert_eq!(infer_kind("https://x/a.woff"), FontKind::Woff);
        assert_eq!(infer_kind("https://x/download?id=7"), FontKind::Ttf);
    }

    #[test]
    fn stylesheet_url_detection() {
        assert!(is_stylesheet_url("https://fonts.googleapis.com/css2?family=Roboto"));
        assert!(!is_stylesheet_url("https://example.com/fonts/roboto.zip"));
    }
}
