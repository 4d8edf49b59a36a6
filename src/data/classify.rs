use super::model::GeneratedFileSet;

// ---------------------------------------------------------------------------
// Marker tables
// ---------------------------------------------------------------------------

/// Presence of any of these names marks a Python backend.
pub const BACKEND_MARKERS: &[&str] = &["main.py", "models.py", "schemas.py", "requirements.txt"];

/// Presence of any of these names marks a runnable React frontend.
pub const FRONTEND_ENTRIES: &[&str] = &["App.jsx", "app.jsx", "App.js", "app.js"];

const HTML_SUFFIX: &str = ".html";

// ---------------------------------------------------------------------------
// ProjectVerdict – derived classification of a file set
// ---------------------------------------------------------------------------

/// Independent facts about a generated file set. More than one may hold.
///
/// Always recomputed from the file set; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectVerdict {
    pub has_backend_marker: bool,
    pub has_frontend_entry: bool,
    /// Names ending in `.html`, in file-set order.
    pub html_file_names: Vec<String>,
}

impl ProjectVerdict {
    /// True when none of the facts hold.
    pub fn is_unclassified(&self) -> bool {
        !self.has_backend_marker && !self.has_frontend_entry && self.html_file_names.is_empty()
    }
}

/// Classify a file set. Pure and total: an empty set yields the default verdict.
pub fn classify(files: &GeneratedFileSet) -> ProjectVerdict {
    ProjectVerdict {
        has_backend_marker: BACKEND_MARKERS.iter().any(|m| files.contains(m)),
        has_frontend_entry: FRONTEND_ENTRIES.iter().any(|m| files.contains(m)),
        html_file_names: files
            .names()
            .filter(|n| n.ends_with(HTML_SUFFIX))
            .map(str::to_owned)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Language hint for highlighting
// ---------------------------------------------------------------------------

/// Advisory highlighting language derived from a file-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageHint {
    Python,
    Jsx,
    Markdown,
    PlainText,
}

const SUFFIX_HINTS: &[(&str, LanguageHint)] = &[
    (".py", LanguageHint::Python),
    (".jsx", LanguageHint::Jsx),
    (".md", LanguageHint::Markdown),
];

impl LanguageHint {
    /// Extension token understood by the syntax highlighter, `None` for plain text.
    pub fn syntax_token(self) -> Option<&'static str> {
        match self {
            LanguageHint::Python => Some("py"),
            LanguageHint::Jsx => Some("js"),
            LanguageHint::Markdown => Some("md"),
            LanguageHint::PlainText => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LanguageHint::Python => "python",
            LanguageHint::Jsx => "jsx",
            LanguageHint::Markdown => "markdown",
            LanguageHint::PlainText => "text",
        }
    }
}

pub fn language_hint(file_name: &str) -> LanguageHint {
    SUFFIX_HINTS
        .iter()
        .find(|(suffix, _)| file_name.ends_with(suffix))
        .map(|&(_, hint)| hint)
        .unwrap_or(LanguageHint::PlainText)
}
