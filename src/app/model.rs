use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::diagnostics::{DiagnosticLog, Generation};
use crate::executor::{Executor, IsolationBoundary, PreviewStatus};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// How soon the preview should be rebuilt after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    /// Coalesce with other edits inside the debounce window.
    Debounced,
    /// Render now, dropping any pending debounced render.
    Immediate,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state. The executor is
/// owned by the event loop; the model keeps a copy of what it reports so
/// the view can be drawn from the model alone.
pub struct Model {
    /// Buffers, active tab and theme
    pub state: AppState,
    /// Project directory holding the source files
    pub project_dir: PathBuf,
    /// Shared view: buffers come from a share link and are never written back
    pub read_only: bool,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Show diagnostics from superseded renders (dimmed)
    pub show_stale: bool,
    /// Console panel scroll, in lines up from the newest entry
    pub log_scroll: usize,
    /// Index of the template applied last, for cycling
    pub template_cursor: Option<usize>,
    /// Link produced by the last share
    pub last_share_url: Option<String>,
    /// Preview status as last reported by the executor
    pub preview_status: PreviewStatus,
    /// Latest render generation, failed attempts included
    pub generation: Generation,
    /// Copy of the executor's diagnostic log
    pub diagnostics: DiagnosticLog,
    /// Description of the isolation boundary in use
    pub boundary: String,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Set by `update` when the preview needs rebuilding
    pub render_request: Option<RenderRequest>,
    /// Set by `update` when `state` changed and should be saved
    pub state_dirty: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("project_dir", &self.project_dir)
            .field("active", &self.state.active())
            .field("read_only", &self.read_only)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a new model with default settings.
    pub fn new(project_dir: PathBuf, state: AppState) -> Self {
        Self {
            state,
            project_dir,
            ..Self::default()
        }
    }

    /// Copy what the executor reports into the model.
    pub fn sync_preview<B: IsolationBoundary>(&mut self, executor: &Executor<B>) {
        self.preview_status = executor.status().clone();
        self.generation = executor.generation();
        self.diagnostics = executor.log().clone();
        self.boundary = executor.describe();
    }

    /// Take the pending render request, if any.
    pub const fn take_render_request(&mut self) -> Option<RenderRequest> {
        self.render_request.take()
    }

    pub(super) fn request_render(&mut self, request: RenderRequest) {
        // An immediate request is never downgraded by a later debounced one.
        if self.render_request != Some(RenderRequest::Immediate) {
            self.render_request = Some(request);
        }
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    pub fn project_name(&self) -> String {
        self.project_dir
            .canonicalize()
            .ok()
            .as_deref()
            .unwrap_or(&self.project_dir)
            .file_name()
            .map_or_else(|| "untitled".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            state: AppState::default(),
            project_dir: PathBuf::from("."),
            read_only: false,
            help_visible: false,
            show_stale: false,
            log_scroll: 0,
            template_cursor: None,
            last_share_url: None,
            preview_status: PreviewStatus::Idle,
            generation: 0,
            diagnostics: DiagnosticLog::default(),
            boundary: String::new(),
            config_global_path: None,
            config_local_path: None,
            render_request: None,
            state_dirty: false,
            should_quit: false,
            toast: None,
        }
    }
}
