use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use crate::clipboard::{ClipboardSink, CopyFeedback};
use crate::data::model::{AnalysisResult, ImagePayload};
use crate::data::validate::validate_request;
use crate::service::{AnalysisService, ServiceError};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Top-level views. Any tab can be selected at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Input,
    Code,
    Preview,
    Analysis,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Input, Tab::Code, Tab::Preview, Tab::Analysis];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Input => "Input",
            Tab::Code => "Code",
            Tab::Preview => "Preview",
            Tab::Analysis => "Analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub active_tab: Tab,
    /// Weak reference into the current file set; may name a file that is absent.
    pub selected_file: Option<String>,
    pub loading: bool,
    pub error_message: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Input,
            selected_file: None,
            loading: false,
            error_message: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result store
// ---------------------------------------------------------------------------

/// Holds the latest analysis result, replaced wholesale by each completed
/// request. Ids are only used for diagnostics.
#[derive(Debug, Default)]
pub struct ResultStore {
    current: Option<(u64, AnalysisResult)>,
    next_id: u64,
}

impl ResultStore {
    /// Replace the stored result wholesale and return its id.
    pub fn replace(&mut self, result: AnalysisResult) -> u64 {
        self.next_id += 1;
        self.current = Some((self.next_id, result));
        self.next_id
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.current.as_ref().map(|(_, r)| r)
    }
}

// ---------------------------------------------------------------------------
// Background work
// ---------------------------------------------------------------------------

/// What produced an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOrigin {
    Generate,
    Example(String),
}

/// Results sent from worker threads back to the UI thread.
#[derive(Debug)]
pub enum BackgroundMessage {
    RequestSettled {
        origin: RequestOrigin,
        outcome: Result<AnalysisResult, ServiceError>,
    },
    ExamplesListed(Result<Vec<String>, ServiceError>),
    HealthChecked(Result<(), ServiceError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Unknown,
    Healthy,
    Unreachable(String),
}

/// Non-blocking notices (clipboard, export, file loading).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Info(String),
    Error(String),
}

pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

const COPY_FAILED: &str = "Copy failed";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub view: ViewState,
    pub results: ResultStore,

    /// Input form.
    pub image: Option<ImagePayload>,
    pub description: String,

    /// Example ids from the service, in service order.
    pub examples: Vec<String>,
    pub service_status: ServiceStatus,

    pub status: Option<StatusLine>,
    pub copy_feedback: CopyFeedback,

    /// The error banner holds a local validation failure.
    input_error: bool,
    tx: Sender<BackgroundMessage>,
    rx: Receiver<BackgroundMessage>,
    repaint: Option<RepaintHook>,
}

impl Default for AppState {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            view: ViewState::default(),
            results: ResultStore::default(),
            image: None,
            description: String::new(),
            examples: Vec::new(),
            service_status: ServiceStatus::Unknown,
            status: None,
            copy_feedback: CopyFeedback::default(),
            input_error: false,
            tx,
            rx,
            repaint: None,
        }
    }
}

impl AppState {
    /// Called from worker threads after they post a message.
    pub fn set_repaint_hook(&mut self, hook: RepaintHook) {
        self.repaint = Some(hook);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.active_tab = tab;
    }

    pub fn select_file(&mut self, name: &str) {
        self.view.selected_file = Some(name.to_string());
    }

    pub fn dismiss_error(&mut self) {
        self.view.error_message = None;
        self.input_error = false;
    }

    pub fn set_image(&mut self, image: ImagePayload) {
        log::info!("Selected image {} ({} bytes)", image.file_name, image.len());
        self.status = Some(StatusLine::Info(format!("Image: {}", image.file_name)));
        self.image = Some(image);
        self.input_changed();
    }

    /// The image or description was edited; a validation banner no longer applies.
    pub fn input_changed(&mut self) {
        if self.input_error {
            self.view.error_message = None;
            self.input_error = false;
        }
    }

    /// Store a new result. The file selection resets because the file set changed.
    pub fn store_result(&mut self, result: AnalysisResult) {
        let id = self.results.replace(result);
        self.view.selected_file = None;
        log::debug!("Stored result #{id}");
    }

    // ---- Requests ----

    /// Validate the input form and, if it passes, send it for analysis.
    pub fn submit_generate(&mut self, service: &Arc<dyn AnalysisService>) {
        if self.view.loading {
            log::debug!("Ignoring generate while a request is in flight");
            return;
        }
        let request = match validate_request(self.image.as_ref(), &self.description) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Generate rejected locally: {e}");
                self.view.error_message = Some(e.to_string());
                self.input_error = true;
                return;
            }
        };

        log::info!("Submitting {} for analysis", request.image.file_name);
        let service = Arc::clone(service);
        self.begin_request(RequestOrigin::Generate, move || service.analyze(&request));
    }

    /// Load a pre-built example. No local validation applies.
    pub fn select_example(&mut self, id: &str, service: &Arc<dyn AnalysisService>) {
        if self.view.loading {
            log::debug!("Ignoring example {id:?} while a request is in flight");
            return;
        }
        log::info!("Fetching example {id:?}");
        let service = Arc::clone(service);
        let owned = id.to_string();
        self.begin_request(RequestOrigin::Example(id.to_string()), move || {
            service.fetch_example(&owned)
        });
    }

    fn begin_request<F>(&mut self, origin: RequestOrigin, call: F)
    where
        F: FnOnce() -> Result<AnalysisResult, ServiceError> + Send + 'static,
    {
        self.view.error_message = None;
        self.input_error = false;
        self.view.loading = true;
        self.view.active_tab = Tab::Code;

        let worker_origin = origin.clone();
        let spawned = self.spawn_worker("analysis-request", move || {
            BackgroundMessage::RequestSettled {
                origin: worker_origin,
                outcome: call(),
            }
        });
        if let Err(e) = spawned {
            self.apply(BackgroundMessage::RequestSettled {
                origin,
                outcome: Err(ServiceError::Transport(format!("could not start request: {e}"))),
            });
        }
    }

    /// Fetch the example list and check service health. Neither sets `loading`.
    pub fn refresh_catalog(&mut self, service: &Arc<dyn AnalysisService>) {
        let list_service = Arc::clone(service);
        let health_service = Arc::clone(service);
        let spawned = self
            .spawn_worker("example-list", move || {
                BackgroundMessage::ExamplesListed(list_service.list_examples())
            })
            .and_then(|()| {
                self.spawn_worker("health-check", move || {
                    BackgroundMessage::HealthChecked(health_service.health())
                })
            });
        if let Err(e) = spawned {
            log::error!("Failed to start catalog refresh: {e}");
        }
    }

    fn spawn_worker<F>(&self, name: &str, task: F) -> std::io::Result<()>
    where
        F: FnOnce() -> BackgroundMessage + Send + 'static,
    {
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // The receiver only goes away when the app is closing.
                let _ = tx.send(task());
                if let Some(repaint) = repaint {
                    repaint();
                }
            })
            .map(|_| ())
    }

    /// Apply every settled background message. Returns true if any arrived.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(msg) => {
                    self.apply(msg);
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    pub fn apply(&mut self, msg: BackgroundMessage) {
        match msg {
            BackgroundMessage::RequestSettled { origin, outcome } => {
                self.view.loading = false;
                match outcome {
                    Ok(result) => {
                        log::info!(
                            "{origin:?} request returned {} files",
                            result.generated_files.len()
                        );
                        self.view.error_message = None;
                        self.store_result(result);
                    }
                    Err(e) => {
                        log::error!("{origin:?} request failed: {e}");
                        self.view.error_message = Some(e.user_message());
                    }
                }
            }
            BackgroundMessage::ExamplesListed(Ok(ids)) => {
                log::info!("{} examples available", ids.len());
                self.examples = ids;
            }
            BackgroundMessage::ExamplesListed(Err(e)) => {
                log::warn!("Could not list examples: {e}");
            }
            BackgroundMessage::HealthChecked(Ok(())) => {
                self.service_status = ServiceStatus::Healthy;
            }
            BackgroundMessage::HealthChecked(Err(e)) => {
                log::warn!("Health check failed: {e}");
                self.service_status = ServiceStatus::Unreachable(e.to_string());
            }
        }
    }

    // ---- Clipboard ----

    /// Copy `text`; failures go to the status line and never propagate.
    pub fn copy_to_clipboard(&mut self, sink: &mut dyn ClipboardSink, key: &str, text: &str) {
        match sink.set_text(text) {
            Ok(()) => {
                self.copy_feedback.mark(key, Instant::now());
                let stale_failure = matches!(
                    &self.status,
                    Some(StatusLine::Error(msg)) if msg.starts_with(COPY_FAILED)
                );
                if stale_failure {
                    self.status = None;
                }
            }
            Err(e) => {
                log::warn!("Copy of {key} failed: {e}");
                self.status = Some(StatusLine::Error(format!("{COPY_FAILED}: {e}")));
            }
        }
    }

    /// Block until one background message arrives and apply it.
    #[cfg(test)]
    pub fn wait_for_message(&mut self) {
        let msg = self
            .rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("background message");
        self.apply(msg);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::clipboard::ClipboardError;
    use crate::data::model::GeneratedFileSet;
    use crate::data::validate::GenerateRequest;

    /// Scripted service that counts calls.
    #[derive(Default)]
    struct FakeService {
        analyze_calls: AtomicUsize,
        example_calls: AtomicUsize,
        analyze_outcome: Mutex<Option<Result<AnalysisResult, ServiceError>>>,
    }

    impl FakeService {
        fn failing(detail: Option<&str>) -> Self {
            let service = FakeService::default();
            *service.analyze_outcome.lock().unwrap() = Some(Err(ServiceError::Rejected {
                status: 500,
                detail: detail.map(str::to_owned),
            }));
            service
        }
    }

    fn result(names: &[&str]) -> AnalysisResult {
        AnalysisResult {
            summary: format!("{} files", names.len()),
            generated_files: names.iter().map(|n| (*n, "...")).collect::<GeneratedFileSet>(),
        }
    }

    impl AnalysisService for FakeService {
        fn analyze(&self, _request: &GenerateRequest) -> Result<AnalysisResult, ServiceError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            self.analyze_outcome
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(result(&["main.py", "App.jsx"])))
        }

        fn list_examples(&self) -> Result<Vec<String>, ServiceError> {
            Ok(vec!["food-pantry".into(), "library".into()])
        }

        fn fetch_example(&self, id: &str) -> Result<AnalysisResult, ServiceError> {
            self.example_calls.fetch_add(1, Ordering::SeqCst);
            if id == "missing" {
                Err(ServiceError::Rejected {
                    status: 404,
                    detail: Some(format!("Example '{id}' not found.")),
                })
            } else {
                Ok(result(&["index.html"]))
            }
        }

        fn health(&self) -> Result<(), ServiceError> {
            Err(ServiceError::Transport("connection refused".into()))
        }
    }

    struct FailingClipboard;

    impl ClipboardSink for FailingClipboard {
        fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Denied("blocked".into()))
        }
    }

    #[derive(Default)]
    struct RecordingClipboard(Vec<String>);

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    fn png() -> ImagePayload {
        ImagePayload::sniff("ui.png", vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap()
    }

    fn ready_state() -> AppState {
        let mut state = AppState::default();
        state.image = Some(png());
        state.description = "inventory dashboard".into();
        state
    }

    fn as_service(fake: &Arc<FakeService>) -> Arc<dyn AnalysisService> {
        Arc::clone(fake) as Arc<dyn AnalysisService>
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::default();
        assert_eq!(state.view, ViewState::default());
        assert_eq!(state.view.active_tab, Tab::Input);
        assert!(state.results.current().is_none());
    }

    #[test]
    fn test_empty_description_does_not_call_service() {
        let fake = Arc::new(FakeService::default());
        let mut state = ready_state();
        state.description = "   ".into();

        state.submit_generate(&as_service(&fake));

        assert_eq!(fake.analyze_calls.load(Ordering::SeqCst), 0);
        assert!(state.view.error_message.is_some());
        assert!(!state.view.loading);
        assert_eq!(state.view.active_tab, Tab::Input);
    }

    #[test]
    fn test_missing_image_sets_validation_error() {
        let fake = Arc::new(FakeService::default());
        let mut state = ready_state();
        state.image = None;
        state.select_tab(Tab::Preview);

        state.submit_generate(&as_service(&fake));

        assert_eq!(fake.analyze_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            state.view.error_message.as_deref(),
            Some("Please choose an image first.")
        );
        assert_eq!(state.view.active_tab, Tab::Preview);
    }

    #[test]
    fn test_successful_generate_stores_result_on_code_tab() {
        let fake = Arc::new(FakeService::default());
        let mut state = ready_state();
        state.view.error_message = Some("old".into());

        state.submit_generate(&as_service(&fake));
        assert!(state.view.loading);
        assert_eq!(state.view.active_tab, Tab::Code);
        assert!(state.view.error_message.is_none());

        state.wait_for_message();
        assert!(!state.view.loading);
        assert_eq!(state.view.active_tab, Tab::Code);
        assert_eq!(fake.analyze_calls.load(Ordering::SeqCst), 1);
        let stored = state.results.current().unwrap();
        assert!(stored.generated_files.contains("main.py"));
    }

    #[test]
    fn test_failed_generate_keeps_previous_result() {
        let fake = Arc::new(FakeService::failing(Some("Failed to process image: quota")));
        let mut state = ready_state();
        state.store_result(result(&["README.md"]));
        let before = state.results.current().cloned();

        state.submit_generate(&as_service(&fake));
        state.wait_for_message();

        assert!(!state.view.loading);
        assert_eq!(state.results.current().cloned(), before);
        assert_eq!(
            state.view.error_message.as_deref(),
            Some("Failed to process image: quota")
        );
    }

    #[test]
    fn test_failure_without_detail_uses_generic_message() {
        let fake = Arc::new(FakeService::failing(None));
        let mut state = ready_state();

        state.submit_generate(&as_service(&fake));
        state.wait_for_message();

        assert_eq!(
            state.view.error_message.as_deref(),
            Some(crate::service::GENERIC_FAILURE)
        );
    }

    #[test]
    fn test_no_overlapping_requests() {
        let fake = Arc::new(FakeService::default());
        let service = as_service(&fake);
        let mut state = ready_state();
        state.view.loading = true;

        state.submit_generate(&service);
        state.select_example("library", &service);

        assert_eq!(fake.analyze_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fake.example_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_example_skips_validation() {
        let fake = Arc::new(FakeService::default());
        let mut state = AppState::default();

        state.select_example("food-pantry", &as_service(&fake));
        assert_eq!(state.view.active_tab, Tab::Code);
        state.wait_for_message();

        assert_eq!(fake.example_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fake.analyze_calls.load(Ordering::SeqCst), 0);
        assert!(state.view.error_message.is_none());
        assert!(state.results.current().unwrap().generated_files.contains("index.html"));
    }

    #[test]
    fn test_example_failure_reports_service_detail() {
        let fake = Arc::new(FakeService::default());
        let mut state = AppState::default();

        state.select_example("missing", &as_service(&fake));
        state.wait_for_message();

        assert_eq!(
            state.view.error_message.as_deref(),
            Some("Example 'missing' not found.")
        );
        assert!(state.results.current().is_none());
    }

    #[test]
    fn test_result_settles_even_after_tab_change() {
        let fake = Arc::new(FakeService::default());
        let mut state = ready_state();

        state.submit_generate(&as_service(&fake));
        state.select_tab(Tab::Analysis);
        state.wait_for_message();

        assert_eq!(state.view.active_tab, Tab::Analysis);
        assert!(state.results.current().is_some());
    }

    #[test]
    fn test_new_result_resets_selection() {
        let mut state = AppState::default();
        state.store_result(result(&["a.py", "b.py"]));
        state.select_file("b.py");

        state.store_result(result(&["c.py"]));
        assert!(state.view.selected_file.is_none());
        assert!(state.results.current().unwrap().generated_files.contains("c.py"));
    }

    #[test]
    fn test_catalog_refresh() {
        let fake = Arc::new(FakeService::default());
        let mut state = AppState::default();

        state.refresh_catalog(&as_service(&fake));
        state.wait_for_message();
        state.wait_for_message();

        assert_eq!(state.examples, ["food-pantry", "library"]);
        assert!(matches!(state.service_status, ServiceStatus::Unreachable(_)));
        assert!(!state.view.loading);
    }

    #[test]
    fn test_clipboard_failure_is_reported_not_fatal() {
        let mut state = AppState::default();
        state.copy_to_clipboard(&mut FailingClipboard, "file:main.py", "print()");

        assert!(matches!(state.status, Some(StatusLine::Error(_))));
        assert!(!state.copy_feedback.is_showing("file:main.py", Instant::now()));
    }

    #[test]
    fn test_clipboard_success_marks_feedback() {
        let mut state = AppState::default();
        let mut clipboard = RecordingClipboard::default();
        state.copy_to_clipboard(&mut clipboard, "cmd:frontend", "npm install");

        assert_eq!(clipboard.0, ["npm install"]);
        assert!(state.copy_feedback.is_showing("cmd:frontend", Instant::now()));
        assert!(state.status.is_none());
    }

    #[test]
    fn test_successful_copy_clears_copy_failure() {
        let mut state = AppState::default();
        state.copy_to_clipboard(&mut FailingClipboard, "file:main.py", "print()");
        assert!(matches!(state.status, Some(StatusLine::Error(_))));

        state.copy_to_clipboard(&mut RecordingClipboard::default(), "file:main.py", "print()");
        assert!(state.status.is_none());
        assert!(state.copy_feedback.is_showing("file:main.py", Instant::now()));
    }

    #[test]
    fn test_successful_copy_keeps_unrelated_error() {
        let mut state = AppState::default();
        state.status = Some(StatusLine::Error("Export failed".into()));

        state.copy_to_clipboard(&mut RecordingClipboard::default(), "cmd:backend", "docker");
        assert_eq!(state.status, Some(StatusLine::Error("Export failed".into())));
    }

    #[test]
    fn test_validation_banner_clears_when_input_changes() {
        let fake = Arc::new(FakeService::default());
        let mut state = ready_state();
        state.image = None;

        state.submit_generate(&as_service(&fake));
        assert!(state.view.error_message.is_some());

        state.set_image(png());
        assert!(state.view.error_message.is_none());

        state.description = " ".into();
        state.submit_generate(&as_service(&fake));
        assert!(state.view.error_message.is_some());
        state.description.push_str("kanban");
        state.input_changed();
        assert!(state.view.error_message.is_none());
        assert_eq!(fake.analyze_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_request_failure_survives_input_edits() {
        let fake = Arc::new(FakeService::failing(Some("quota exceeded")));
        let mut state = ready_state();

        state.submit_generate(&as_service(&fake));
        state.wait_for_message();
        state.input_changed();

        assert_eq!(state.view.error_message.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_result_ids_increase() {
        let mut store = ResultStore::default();
        let first = store.replace(result(&["a.py"]));
        let second = store.replace(result(&["a.py"]));
        assert!(second > first);
    }

    #[test]
    fn test_poll_without_messages() {
        let mut state = AppState::default();
        assert!(!state.poll());
    }
}
