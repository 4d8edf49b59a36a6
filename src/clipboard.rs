use std::time::{Duration, Instant};

use thiserror::Error;

/// How long the "Copied" confirmation stays visible.
pub const COPY_FEEDBACK_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard access denied: {0}")]
    Denied(String),
}

/// Destination for copy actions.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

// ---------------------------------------------------------------------------
// System clipboard (arboard)
// ---------------------------------------------------------------------------

/// System clipboard, opened lazily so a missing clipboard only fails the copy.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().map_err(map_arboard)?);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard.set_text(text).map_err(map_arboard),
            None => Err(ClipboardError::Unavailable("not initialised".into())),
        }
    }
}

fn map_arboard(e: arboard::Error) -> ClipboardError {
    match e {
        arboard::Error::ClipboardOccupied => ClipboardError::Denied(e.to_string()),
        other => ClipboardError::Unavailable(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Transient "copied" feedback
// ---------------------------------------------------------------------------

/// Remembers the most recent successful copy for a short time.
///
/// A newer copy replaces the older one, so an expiry belonging to an earlier
/// copy can never hide the newer confirmation.
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    last: Option<(String, Instant)>,
    ttl: Duration,
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self::with_ttl(COPY_FEEDBACK_TTL)
    }
}

impl CopyFeedback {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { last: None, ttl }
    }

    /// Record a successful copy of the item identified by `key`.
    pub fn mark(&mut self, key: &str, now: Instant) {
        self.last = Some((key.to_string(), now));
    }

    /// Whether the confirmation for `key` should still be shown.
    pub fn is_showing(&self, key: &str, now: Instant) -> bool {
        matches!(&self.last, Some((k, at)) if k == key && now.duration_since(*at) < self.ttl)
    }

    /// Time until the current confirmation expires, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let (_, at) = self.last.as_ref()?;
        self.ttl.checked_sub(now.duration_since(*at)).filter(|d| !d.is_zero())
    }

    /// Drop an expired confirmation.
    pub fn expire(&mut self, now: Instant) {
        if self.remaining(now).is_none() {
            self.last = None;
        }
    }
}
