use std::time::Instant;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::clipboard::ClipboardSink;
use crate::data::classify::classify;
use crate::data::document::{visible_blocks, Block};
use crate::data::model::GeneratedFileSet;
use crate::state::AppState;
use crate::ui::{code, panels};

// ---------------------------------------------------------------------------
// Run guidance
// ---------------------------------------------------------------------------

/// How to run a generated project locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunGuidance {
    Frontend,
    Backend,
}

impl RunGuidance {
    pub fn title(self) -> &'static str {
        match self {
            RunGuidance::Frontend => "Run the frontend",
            RunGuidance::Backend => "Run the backend",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RunGuidance::Frontend => {
                "Export the files, install the packages, then start the dev server and open the printed URL."
            }
            RunGuidance::Backend => {
                "This project is an API service. Export the files and start it with Docker; there is no live preview."
            }
        }
    }

    pub fn command(self) -> &'static str {
        match self {
            RunGuidance::Frontend => "npm install && npm run dev",
            RunGuidance::Backend => "docker compose up --build",
        }
    }

    fn copy_key(self) -> &'static str {
        match self {
            RunGuidance::Frontend => "cmd:frontend",
            RunGuidance::Backend => "cmd:backend",
        }
    }
}

// ---------------------------------------------------------------------------
// Preview plan
// ---------------------------------------------------------------------------

/// What the preview tab shows for a file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPlan<'a> {
    /// Frontend guidance wins over backend guidance.
    pub guidance: Option<RunGuidance>,
    /// `(name, content)` of every `.html` file, in file-set order.
    pub documents: Vec<(&'a str, &'a str)>,
}

impl<'a> PreviewPlan<'a> {
    pub fn from_files(files: &'a GeneratedFileSet) -> Self {
        let verdict = classify(files);
        let guidance = if verdict.has_frontend_entry {
            Some(RunGuidance::Frontend)
        } else if verdict.has_backend_marker {
            Some(RunGuidance::Backend)
        } else {
            None
        };
        let documents = files
            .iter()
            .filter(|(name, _)| verdict.html_file_names.iter().any(|h| h.as_str() == *name))
            .collect();
        Self {
            guidance,
            documents,
        }
    }

    /// True when there is nothing to show but the "no preview" message.
    pub fn is_empty(&self) -> bool {
        self.guidance.is_none() && self.documents.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Preview tab
// ---------------------------------------------------------------------------

pub fn preview_pane(ui: &mut Ui, state: &mut AppState, clipboard: &mut dyn ClipboardSink) {
    panels::loading_indicator(ui, state);

    let Some(result) = state.results.current() else {
        panels::placeholder(ui, "No data yet. Generate a project or load an example.");
        return;
    };

    let plan = PreviewPlan::from_files(&result.generated_files);
    if plan.is_empty() {
        panels::placeholder(ui, "No preview available for this project.");
        return;
    }

    let mut copy_request = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(guidance) = plan.guidance {
                let copied = state
                    .copy_feedback
                    .is_showing(guidance.copy_key(), Instant::now());
                if guidance_panel(ui, guidance, copied) {
                    copy_request = Some(guidance);
                }
                ui.add_space(8.0);
            }
            for (name, content) in &plan.documents {
                document_panel(ui, name, content);
                ui.add_space(8.0);
            }
        });

    if let Some(guidance) = copy_request {
        state.copy_to_clipboard(clipboard, guidance.copy_key(), guidance.command());
    }
}

/// Returns true when the copy button was clicked.
fn guidance_panel(ui: &mut Ui, guidance: RunGuidance, copied: bool) -> bool {
    let mut clicked = false;
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.heading(guidance.title());
        ui.label(guidance.description());
        ui.add_space(4.0);
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new(guidance.command()).monospace().strong());
            let label = if copied { "Copied!" } else { "Copy" };
            clicked = ui.small_button(label).clicked();
        });
    });
    clicked
}

/// Passive rendering of an HTML file: visible text only, nothing executed.
fn document_panel(ui: &mut Ui, name: &str, content: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(name).strong().monospace());
        ui.separator();

        let blocks = visible_blocks(content);
        if blocks.is_empty() {
            ui.label(RichText::new("(document has no visible text)").weak());
        }
        for block in &blocks {
            match block {
                Block::Heading(text) => {
                    ui.heading(text.as_str());
                }
                Block::Text(text) => {
                    ui.label(text.as_str());
                }
            }
        }

        egui::CollapsingHeader::new("Markup")
            .id_salt(("markup", name))
            .default_open(false)
            .show(ui, |ui: &mut Ui| code::show_highlighted(ui, content, "html"));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(entries: &[(&str, &str)]) -> GeneratedFileSet {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_frontend_wins_over_backend() {
        let set = files(&[("main.py", "app = FastAPI()"), ("App.jsx", "export default App;")]);
        let plan = PreviewPlan::from_files(&set);
        assert_eq!(plan.guidance, Some(RunGuidance::Frontend));
        assert!(plan.documents.is_empty());
    }

    #[test]
    fn test_backend_only_project() {
        let set = files(&[("main.py", "..."), ("requirements.txt", "fastapi")]);
        let plan = PreviewPlan::from_files(&set);
        assert_eq!(plan.guidance, Some(RunGuidance::Backend));
        assert!(plan.documents.is_empty());
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_single_html_document() {
        let set = files(&[("index.html", "<h1>Hi</h1>")]);
        let plan = PreviewPlan::from_files(&set);
        assert_eq!(plan.guidance, None);
        assert_eq!(plan.documents, [("index.html", "<h1>Hi</h1>")]);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_documents_render_alongside_guidance() {
        let set = files(&[
            ("about.html", "<p>a</p>"),
            ("models.py", "..."),
            ("index.html", "<p>i</p>"),
        ]);
        let plan = PreviewPlan::from_files(&set);
        assert_eq!(plan.guidance, Some(RunGuidance::Backend));
        let names: Vec<&str> = plan.documents.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["about.html", "index.html"]);
    }

    #[test]
    fn test_unclassified_project_has_empty_plan() {
        let set = files(&[("README.md", "# Notes"), ("style.css", "body {}")]);
        assert!(PreviewPlan::from_files(&set).is_empty());
        assert!(PreviewPlan::from_files(&GeneratedFileSet::new()).is_empty());
    }

    #[test]
    fn test_guidance_commands() {
        assert_eq!(RunGuidance::Frontend.command(), "npm install && npm run dev");
        assert!(RunGuidance::Backend.command().starts_with("docker compose"));
    }
}
