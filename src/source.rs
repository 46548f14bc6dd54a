//! Source buffers: the markup/styles/script triple that defines a project.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// One of the three editable buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Markup,
    Styles,
    Script,
}

impl Language {
    /// All languages in tab order.
    pub const ALL: [Self; 3] = [Self::Markup, Self::Styles, Self::Script];

    /// Fixed file name used for project directories and exported archives.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Markup => "index.html",
            Self::Styles => "styles.css",
            Self::Script => "script.js",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Styles => "css",
            Self::Script => "js",
        }
    }

    /// Tab label shown in the status bar.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Markup => "HTML",
            Self::Styles => "CSS",
            Self::Script => "JavaScript",
        }
    }

    /// Map a file name to the buffer it belongs to by extension.
    ///
    /// Only the exact lowercase extensions `.html`, `.css` and `.js` are
    /// recognized; anything else returns `None`.
    pub fn for_file(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        Self::ALL.into_iter().find(|lang| lang.extension() == ext)
    }

    /// Next tab, wrapping around.
    pub const fn next(self) -> Self {
        match self {
            Self::Markup => Self::Styles,
            Self::Styles => Self::Script,
            Self::Script => Self::Markup,
        }
    }
}

/// The three source buffers of one playground project.
///
/// Every field is always present; a missing buffer is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSet {
    pub markup: String,
    pub styles: String,
    pub script: String,
}

impl SourceSet {
    pub fn new(
        markup: impl Into<String>,
        styles: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            styles: styles.into(),
            script: script.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Markup => &self.markup,
            Language::Styles => &self.styles,
            Language::Script => &self.script,
        }
    }

    /// Replace one buffer. Returns true if the content actually changed.
    pub fn set(&mut self, language: Language, text: impl Into<String>) -> bool {
        let text = text.into();
        let slot = match language {
            Language::Markup => &mut self.markup,
            Language::Styles => &mut self.styles,
            Language::Script => &mut self.script,
        };
        if *slot == text {
            return false;
        }
        *slot = text;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty() && self.styles.is_empty() && self.script.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_file_maps_known_extensions() {
        assert_eq!(Language::for_file("index.html"), Some(Language::Markup));
        assert_eq!(Language::for_file("a.css"), Some(Language::Styles));
        assert_eq!(Language::for_file("dir/app.js"), Some(Language::Script));
    }

    #[test]
    fn test_for_file_ignores_unknown_extensions() {
        assert_eq!(Language::for_file("readme.md"), None);
        assert_eq!(Language::for_file("noext"), None);
        assert_eq!(Language::for_file("page.htm"), None);
    }

    #[test]
    fn test_set_reports_change() {
        let mut set = SourceSet::default();
        assert!(set.set(Language::Styles, "body{}"));
        assert!(!set.set(Language::Styles, "body{}"));
        assert_eq!(set.get(Language::Styles), "body{}");
        assert!(set.markup.is_empty());
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let set: SourceSet = serde_json::from_str(r#"{"markup":"<p>x</p>"}"#).unwrap();
        assert_eq!(set.markup, "<p>x</p>");
        assert_eq!(set.styles, "");
        assert_eq!(set.script, "");
    }

    #[test]
    fn test_next_cycles_through_tabs() {
        assert_eq!(Language::Markup.next(), Language::Styles);
        assert_eq!(Language::Script.next(), Language::Markup);
    }
}
