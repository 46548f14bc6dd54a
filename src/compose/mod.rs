//! Preview composition.
//!
//! Turns a [`SourceSet`] into one self-contained HTML document:
//! - viewport meta so narrow previews match a real device
//! - a fixed reset stylesheet ahead of the user's styles
//! - markup verbatim in the body
//! - the diagnostic shim, then the user's script
//!
//! Composition performs no escaping. The preview runs the user's own code
//! and the composed document trusts its inputs completely; isolation from
//! the host is the executor's job, not the compositor's.

mod shim;

use std::fmt;

pub use shim::{RELAY_TYPE, UNSERIALIZABLE};

use crate::source::SourceSet;

/// Baseline styles applied before the user's stylesheet.
pub const RESET_STYLES: &str = "*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }\n\
body { font-family: system-ui, -apple-system, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif; line-height: 1.5; }";

pub const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

/// A complete, immutable preview document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderDocument(String);

impl RenderDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RenderDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RenderDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Knobs for [`compose_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Document title shown by the preview host.
    pub title: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            title: "Preview".to_string(),
        }
    }
}

/// Compose a preview document with default options.
pub fn compose(sources: &SourceSet) -> RenderDocument {
    compose_with(sources, &ComposeOptions::default())
}

/// Compose a preview document.
///
/// Pure and deterministic: the same inputs always produce the same bytes.
/// The shim's sequence counter lives inside the document and restarts at
/// one every time the document is loaded.
pub fn compose_with(sources: &SourceSet, options: &ComposeOptions) -> RenderDocument {
    let capacity = sources.markup.len()
        + sources.styles.len()
        + sources.script.len()
        + RESET_STYLES.len()
        + shim::SHIM_SCRIPT.len()
        + 256;
    let mut out = String::with_capacity(capacity);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str(VIEWPORT_META);
    out.push('\n');
    out.push_str("<title>");
    out.push_str(&options.title);
    out.push_str("</title>\n");
    out.push_str("<style>\n");
    out.push_str(RESET_STYLES);
    out.push_str("\n</style>\n");
    out.push_str("<style>\n");
    out.push_str(&sources.styles);
    out.push_str("\n</style>\n");
    out.push_str("</head>\n<body>\n");
    out.push_str(&sources.markup);
    out.push_str("\n<script>\n");
    out.push_str(shim::SHIM_SCRIPT);
    out.push_str("\n</script>\n");
    out.push_str("<script>\n");
    out.push_str(&sources.script);
    out.push_str("\n</script>\n");
    out.push_str("</body>\n</html>\n");

    RenderDocument(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceSet {
        SourceSet::new("<p>h</p>", "p{color:blue}", "console.log(1)")
    }

    #[test]
    fn test_compose_contains_all_buffers() {
        let doc = compose(&sample());
        assert!(doc.as_str().contains("<p>h</p>"));
        assert!(doc.as_str().contains("p{color:blue}"));
        assert!(doc.as_str().contains("console.log(1)"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        assert_eq!(compose(&sample()), compose(&sample()));
    }

    #[test]
    fn test_shim_runs_before_user_script() {
        let doc = compose(&sample());
        let text = doc.as_str();
        let shim_at = text.find("window.parent.postMessage").unwrap();
        let script_at = text.find("console.log(1)").unwrap();
        assert!(shim_at < script_at, "shim must be installed before user code runs");
    }

    #[test]
    fn test_reset_precedes_user_styles() {
        let doc = compose(&sample());
        let text = doc.as_str();
        let reset_at = text.find("box-sizing: border-box").unwrap();
        let styles_at = text.find("p{color:blue}").unwrap();
        assert!(reset_at < styles_at);
    }

    #[test]
    fn test_viewport_meta_is_embedded() {
        let doc = compose(&SourceSet::default());
        assert!(doc.as_str().contains(VIEWPORT_META));
    }

    #[test]
    fn test_markup_is_not_escaped() {
        let sources = SourceSet::new("<b>&amp; \"q\"</b>", "", "");
        let doc = compose(&sources);
        assert!(doc.as_str().contains("<b>&amp; \"q\"</b>"));
    }

    #[test]
    fn test_custom_title() {
        let options = ComposeOptions {
            title: "Shared".to_string(),
        };
        let doc = compose_with(&SourceSet::default(), &options);
        assert!(doc.as_str().contains("<title>Shared</title>"));
    }

    #[test]
    fn test_shim_wraps_every_console_level() {
        for level in ["\"log\"", "\"info\"", "\"warn\"", "\"error\""] {
            assert!(shim::SHIM_SCRIPT.contains(level), "missing {level}");
        }
        assert!(shim::SHIM_SCRIPT.contains(UNSERIALIZABLE));
    }
}
