//! # Pillar Grid Preview
//!
//! Live preview front end for a parametric pillar-grid configurator. A
//! remote geometry service computes pillar and hole positions; this crate
//! keeps the preview in step with the parameters while they are edited.
//!
//! ## Features
//! - Debounced preview requests with stale-response rejection
//! - Width and height locks solved by adjusting floor padding
//! - Measurement overlay and side profile with a configurable style
//! - Parameter documents, style documents, PNG and STL export

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod render;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod style;
pub mod types;
mod ui;

pub use config::AppConfig;
pub use error::AppError;
pub use ui::{
    AppEvent, FileOperationResult, GeometryBackend, HttpBackend, PendingFileOperation, PreviewApp,
    StatusKind,
};

/// Runs the preview application with configuration from the environment.
///
/// File dialogs and service requests run on a tokio runtime that lives as
/// long as the window.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), pillar_preview::AppError> {
///     pillar_preview::run_app()
/// }
/// ```
pub fn run_app() -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let config = AppConfig::from_env();

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Pillar Grid Preview",
        options,
        Box::new(move |_cc| Ok(Box::new(PreviewApp::new(&config)))),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LayoutType, Parameters};

    #[test]
    fn test_default_parameters() {
        let params = Parameters::default();
        assert_eq!(params.layout_type, LayoutType::HexCheckerboard);
        assert_eq!(params.rows, 10.0);
        assert_eq!(params.spacing, 0.35);
    }

    #[test]
    fn test_app_starts_with_pending_update() {
        let app = PreviewApp::new(&AppConfig::default());
        assert!(app.scheduler.is_busy());
        assert!(app.store.preview().is_none());
        assert_eq!(app.form.seed, "42");
    }
}
