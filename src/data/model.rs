use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// GeneratedFileSet – file name → generated source text
// ---------------------------------------------------------------------------

/// Generated files keyed by name, kept in the order the service sent them.
///
/// Names are unique and compared case-sensitively. Inserting an existing
/// name replaces its content but keeps its original position, so tab order
/// stays stable for the lifetime of a result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFileSet {
    files: Vec<(String, String)>,
}

impl GeneratedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        match self.files.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = content,
            None => self.files.push((name, content)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|(n, _)| n == name)
    }

    /// File names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, content)` pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn first_name(&self) -> Option<&str> {
        self.files.first().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for GeneratedFileSet {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut set = GeneratedFileSet::new();
        for (name, content) in iter {
            set.insert(name, content);
        }
        set
    }
}

// -- Serde as a plain JSON object, preserving key order --

impl Serialize for GeneratedFileSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.files.len()))?;
        for (name, content) in &self.files {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GeneratedFileSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FileSetVisitor;

        impl<'de> Visitor<'de> for FileSetVisitor {
            type Value = GeneratedFileSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping file names to file contents")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = GeneratedFileSet::new();
                while let Some((name, content)) = access.next_entry::<String, String>()? {
                    set.insert(name, content);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(FileSetVisitor)
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult – one completed analysis
// ---------------------------------------------------------------------------

/// Payload returned by the analysis service (and stored in result files).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "analysis_summary", default)]
    pub summary: String,
    #[serde(default)]
    pub generated_files: GeneratedFileSet,
}

// ---------------------------------------------------------------------------
// ImagePayload – the picture submitted for analysis
// ---------------------------------------------------------------------------

static NEXT_PAYLOAD_ID: AtomicU64 = AtomicU64::new(1);

/// Raw image bytes plus the MIME type sniffed from them.
///
/// Every loaded payload gets its own id, shared by its clones, so two picks of
/// files with the same name never share a thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    id: u64,
    pub file_name: String,
    pub bytes: Arc<[u8]>,
    pub mime: &'static str,
}

impl ImagePayload {
    /// Wrap `bytes` if they look like a known image format.
    pub fn sniff(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Option<Self> {
        let bytes = bytes.into();
        let format = image::guess_format(&bytes).ok()?;
        Some(ImagePayload {
            id: NEXT_PAYLOAD_ID.fetch_add(1, Ordering::Relaxed),
            file_name: file_name.into(),
            bytes,
            mime: format.to_mime_type(),
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// URI under which egui's image loaders cache the thumbnail.
    pub fn uri(&self) -> String {
        format!("bytes://input/{}/{}", self.id, self.file_name)
    }
}
