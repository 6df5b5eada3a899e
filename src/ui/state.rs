//! Application state structures.
//!
//! [`PreviewApp`] owns the parameter store, style registry and update
//! scheduler as plain fields. Async work reports back through a single
//! [`AppEvent`] channel that is drained at the start of every frame.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

use eframe::egui;

use super::backend::{GeometryBackend, HttpBackend};
use crate::config::AppConfig;
use crate::constants;
use crate::error::ServiceError;
use crate::scheduler::{FetchStage, Generation, UpdateScheduler};
use crate::service::{Artifact, PreviewService};
use crate::store::ParameterStore;
use crate::style::StyleRegistry;
use crate::types::PreviewGeometry;

/// View options that affect drawing but not the requested geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Zoom factor applied on top of the fit
    pub zoom: f32,
    /// Whether the measurement overlay and side profile are shown
    pub show_measurements: bool,
    /// Whether editing one padding also sets the other
    pub link_padding: bool,
    /// Size of the preview canvas on the last frame
    pub canvas_size: egui::Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: constants::DEFAULT_ZOOM,
            show_measurements: false,
            link_padding: true,
            canvas_size: egui::vec2(800.0, 600.0),
        }
    }
}

/// Free-text inputs that are parsed only when committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBuffers {
    /// Random seed as typed
    pub seed: String,
    /// Lock target for the width
    pub target_width: String,
    /// Lock target for the height
    pub target_height: String,
}

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Progress or neutral information
    Info,
    /// A completed action
    Success,
    /// A failed action
    Error,
}

impl StatusKind {
    /// Text colour for the status line.
    pub fn color(&self) -> egui::Color32 {
        match self {
            StatusKind::Info => egui::Color32::from_rgb(60, 60, 60),
            StatusKind::Success => egui::Color32::from_rgb(39, 174, 96),
            StatusKind::Error => egui::Color32::from_rgb(231, 76, 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    expires_at: f64,
}

/// Single status line with auto-clearing messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusLine {
    message: Option<StatusMessage>,
}

impl StatusLine {
    /// Shows `text` for `secs` seconds from `now`.
    pub fn show(&mut self, text: impl Into<String>, kind: StatusKind, now: f64, secs: f64) {
        self.message = Some(StatusMessage {
            text: text.into(),
            kind,
            expires_at: now + secs,
        });
    }

    /// Shows a success message for the short timeout.
    pub fn success(&mut self, text: impl Into<String>, now: f64) {
        self.show(text, StatusKind::Success, now, constants::STATUS_SUCCESS_SECS);
    }

    /// Shows an error message for the long timeout.
    pub fn error(&mut self, text: impl Into<String>, now: f64) {
        self.show(text, StatusKind::Error, now, constants::STATUS_ERROR_SECS);
    }

    /// The message still visible at `now`.
    pub fn current(&self, now: f64) -> Option<(&str, StatusKind)> {
        self.message
            .as_ref()
            .filter(|m| now < m.expires_at)
            .map(|m| (m.text.as_str(), m.kind))
    }

    /// When the visible message disappears.
    pub fn expires_at(&self) -> Option<f64> {
        self.message.as_ref().map(|m| m.expires_at)
    }
}

/// Outcome of a file dialog task.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOperationResult {
    /// Parameter document written to the path
    ParamsSaved(String),
    /// Parameter document read from the path
    ParamsLoaded {
        /// Source path
        path: String,
        /// File contents
        content: String,
    },
    /// Style document written to the path
    StylesSaved(String),
    /// Style document read from the path
    StylesLoaded {
        /// Source path
        path: String,
        /// File contents
        content: String,
    },
    /// Preview image written to the path
    ImageSaved(String),
    /// Generated STL written to the path
    ArtifactSaved {
        /// Destination path
        path: String,
        /// Generation summary reported by the service
        summary: String,
    },
    /// Reading or writing failed
    OperationFailed(String),
}

/// File operation requested by the UI and started on the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingFileOperation {
    /// Save the parameter document
    ExportParameters,
    /// Open a parameter document
    ImportParameters,
    /// Save the preview as PNG
    ExportImage,
    /// Save the active style document
    SaveStyles,
    /// Open a style document
    LoadStyles,
    /// Save a generated STL
    SaveArtifact(Artifact),
}

/// Everything async tasks report back to the frame loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A preview fetch finished
    Preview {
        /// Cycle the fetch belonged to
        generation: Generation,
        /// Position within the cycle
        stage: FetchStage,
        /// Geometry or the reason there is none
        result: Result<PreviewGeometry, ServiceError>,
    },
    /// An artifact request finished
    Generated(Result<Artifact, ServiceError>),
    /// A file dialog task finished
    File(FileOperationResult),
}

/// Main application state.
pub struct PreviewApp {
    /// Parameters, geometry and locks
    pub store: ParameterStore,
    /// Measurement overlay style
    pub styles: StyleRegistry,
    /// Preview request coalescing
    pub scheduler: UpdateScheduler,
    /// Drawing options
    pub view: ViewState,
    /// Uncommitted text inputs
    pub form: FormBuffers,
    /// Status line below the toolbar
    pub status: StatusLine,
    /// Start time of the artifact request in flight
    pub generating_since: Option<f64>,
    /// File operation to start on the next frame
    pub pending_file_operation: Option<PendingFileOperation>,
    /// Where preview and artifact requests go
    pub backend: Box<dyn GeometryBackend>,
    /// Sender handed to async tasks
    pub events: Sender<AppEvent>,
    /// Receiver drained every frame
    pub inbox: Receiver<AppEvent>,
}

impl PreviewApp {
    /// Creates the application talking to the configured service.
    pub fn new(config: &AppConfig) -> Self {
        let seconds = |secs: f64, fallback: f64| {
            Duration::try_from_secs_f64(secs).unwrap_or_else(|_| Duration::from_secs_f64(fallback))
        };
        let service = PreviewService::new(config.service_url.clone()).with_timeouts(
            seconds(config.preview_timeout_secs, constants::PREVIEW_TIMEOUT_SECS),
            seconds(config.generate_timeout_secs, constants::GENERATE_TIMEOUT_SECS),
        );
        let backend = HttpBackend::new(service);
        let scheduler = UpdateScheduler::new(config.debounce_secs, config.settle_secs);
        Self::with_backend(Box::new(backend), scheduler)
    }

    /// Creates the application with an explicit backend and scheduler.
    ///
    /// An initial preview cycle is requested immediately.
    pub fn with_backend(backend: Box<dyn GeometryBackend>, mut scheduler: UpdateScheduler) -> Self {
        let (events, inbox) = channel();
        scheduler.request_update(0.0);
        let store = ParameterStore::new();
        let form = FormBuffers {
            seed: format!("{}", store.parameters().seed),
            ..FormBuffers::default()
        };
        Self {
            store,
            styles: StyleRegistry::new(),
            scheduler,
            view: ViewState::default(),
            form,
            status: StatusLine::default(),
            generating_since: None,
            pending_file_operation: None,
            backend,
            events,
            inbox,
        }
    }

    /// Re-reads text inputs that mirror parameters.
    pub fn refresh_form(&mut self) {
        let seed = self.store.parameters().seed;
        self.form.seed = if seed.is_finite() {
            format!("{}", seed)
        } else {
            String::new()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages_expire() {
        let mut status = StatusLine::default();
        status.success("Parameters exported", 10.0);
        assert_eq!(
            status.current(12.9),
            Some(("Parameters exported", StatusKind::Success))
        );
        assert_eq!(status.current(13.0), None);

        status.error("Error: boom", 20.0);
        assert_eq!(status.expires_at(), Some(25.0));
        assert!(status.current(24.5).is_some());
        assert!(status.current(25.0).is_none());
    }

    #[test]
    fn test_view_defaults() {
        let view = ViewState::default();
        assert_eq!(view.zoom, 0.85);
        assert!(!view.show_measurements);
        assert!(view.link_padding);
    }
}
