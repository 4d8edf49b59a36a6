/// Data layer: result types, classification, validation and file I/O.
///
/// Architecture:
/// ```text
///  analysis service / result file
///        │
///        ▼
///   ┌────────────────┐
///   │ AnalysisResult  │  summary + GeneratedFileSet (ordered)
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  file names → ProjectVerdict, language hints
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ document  │  .html content → visible text blocks
///   └──────────┘
/// ```

pub mod classify;
pub mod document;
pub mod loader;
pub mod model;
pub mod validate;
