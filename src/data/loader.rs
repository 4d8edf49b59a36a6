use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use super::model::{AnalysisResult, GeneratedFileSet, ImagePayload};
use super::validate::ValidationError;

// ---------------------------------------------------------------------------
// Image input
// ---------------------------------------------------------------------------

/// Image extensions offered by the file dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Read an image from disk. The format is sniffed from the bytes, not the extension.
pub fn load_image(path: &Path) -> Result<ImagePayload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    ImagePayload::sniff(file_name, bytes)
        .ok_or(ValidationError::NotAnImage)
        .with_context(|| format!("loading {}", path.display()))
}

// ---------------------------------------------------------------------------
// Saved results
// ---------------------------------------------------------------------------

/// Load a result file in the service's wire format:
///
/// ```json
/// {
///   "analysis_summary": "A library tracker…",
///   "generated_files": { "main.py": "…", "App.jsx": "…" }
/// }
/// ```
pub fn load_result_file(path: &Path) -> Result<AnalysisResult> {
    let text = std::fs::read_to_string(path).context("reading result file")?;
    serde_json::from_str(&text).context("parsing result JSON")
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Outcome of writing a file set to disk.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: usize,
    /// Names refused because they would escape the target directory.
    pub skipped: Vec<String>,
}

/// Write every generated file below `dir`, creating parent directories.
pub fn export_files(files: &GeneratedFileSet, dir: &Path) -> Result<ExportReport> {
    let mut report = ExportReport::default();

    for (name, content) in files.iter() {
        let Some(relative) = safe_relative_path(name) else {
            log::warn!("Refusing to export {name:?}: not a plain relative path");
            report.skipped.push(name.to_string());
            continue;
        };

        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&target, content)
            .with_context(|| format!("writing {}", target.display()))?;
        report.written += 1;
    }

    Ok(report)
}

/// Accept only names made of normal path components.
fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut components = path.components().peekable();
    components.peek()?;
    components
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}
