//! File operations: parameter documents, style documents, preview images and
//! generated STL files.
//!
//! Dialogs run as tokio tasks and report through the application's event
//! channel; nothing here blocks the frame loop.

use std::sync::mpsc::Sender;

use chrono::{Local, Utc};
use eframe::egui;

use super::state::{AppEvent, FileOperationResult, PendingFileOperation, PreviewApp, StatusKind};
use crate::constants;
use crate::document;

impl PreviewApp {
    /// Starts the file operation requested since the last frame.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        let Some(operation) = self.pending_file_operation.take() else {
            return;
        };
        let now = ctx.input(|i| i.time);
        let sender = self.events.clone();

        match operation {
            PendingFileOperation::ExportParameters => {
                let text = document::export_parameters(
                    self.store.parameters(),
                    self.store.statistics().as_ref(),
                    &Local::now(),
                );
                spawn_save(
                    ctx,
                    sender,
                    ("Text", "txt"),
                    document::params_filename(&Utc::now()),
                    text.into_bytes(),
                    FileOperationResult::ParamsSaved,
                );
            }
            PendingFileOperation::ImportParameters => {
                spawn_open(ctx, sender, ("Text", "txt"), |path, content| {
                    FileOperationResult::ParamsLoaded { path, content }
                });
            }
            PendingFileOperation::ExportImage => {
                match self.export_png(ctx, ctx.pixels_per_point()) {
                    Ok(png) => spawn_save(
                        ctx,
                        sender,
                        ("PNG", "png"),
                        document::image_filename(&Utc::now()),
                        png,
                        FileOperationResult::ImageSaved,
                    ),
                    Err(e) => {
                        log::warn!("Image export failed: {}", e);
                        self.status.error(format!("Export failed: {}", e), now);
                    }
                }
            }
            PendingFileOperation::SaveStyles => match self.styles.export_string() {
                Ok(json) => spawn_save(
                    ctx,
                    sender,
                    ("JSON", "json"),
                    "measurement-styles.json".to_string(),
                    json.into_bytes(),
                    FileOperationResult::StylesSaved,
                ),
                Err(e) => self.status.error(format!("Style export failed: {}", e), now),
            },
            PendingFileOperation::LoadStyles => {
                spawn_open(ctx, sender, ("JSON", "json"), |path, content| {
                    FileOperationResult::StylesLoaded { path, content }
                });
            }
            PendingFileOperation::SaveArtifact(artifact) => {
                let summary = artifact.summary();
                let name = document::artifact_filename(self.store.parameters().layout_type, &Utc::now());
                spawn_save(
                    ctx,
                    sender,
                    ("STL", "stl"),
                    name,
                    artifact.bytes,
                    move |path| FileOperationResult::ArtifactSaved { path, summary },
                );
            }
        }
    }

    /// Applies the outcome of a finished file task.
    pub fn apply_file_result(&mut self, result: FileOperationResult, now: f64) {
        match result {
            FileOperationResult::ParamsSaved(path) => {
                log::info!("Parameters saved to {}", path);
                self.status.success("Parameters exported", now);
            }
            FileOperationResult::ParamsLoaded { path, content } => {
                let patch = document::import_parameters(&content);
                log::info!("Loaded {} parameters from {}", patch.len(), path);
                self.store.set_parameters(patch);
                self.refresh_form();
                self.scheduler.request_update(now);
                self.status.success("Parameters loaded", now);
            }
            FileOperationResult::StylesSaved(path) => {
                log::info!("Styles saved to {}", path);
                self.status.success("Styles exported", now);
            }
            FileOperationResult::StylesLoaded { path, content } => match self.styles.load_str(&content) {
                Ok(()) => {
                    log::info!("Styles loaded from {}", path);
                    self.status.success("Styles loaded", now);
                }
                Err(e) => {
                    log::warn!("Rejected style document {}: {}", path, e);
                    self.status.error(format!("Load error: {}", e), now);
                }
            },
            FileOperationResult::ImageSaved(path) => {
                log::info!("Image saved to {}", path);
                self.status.success("Image exported", now);
            }
            FileOperationResult::ArtifactSaved { path, summary } => {
                log::info!("STL saved to {}", path);
                // Generation results stay up as long as errors do.
                self.status
                    .show(summary, StatusKind::Success, now, constants::STATUS_ERROR_SECS);
            }
            FileOperationResult::OperationFailed(error) => {
                log::warn!("File operation failed: {}", error);
                self.status.error(error, now);
            }
        }
    }
}

fn spawn_save(
    ctx: &egui::Context,
    sender: Sender<AppEvent>,
    (filter, extension): (&'static str, &'static str),
    file_name: String,
    bytes: Vec<u8>,
    on_saved: impl FnOnce(String) -> FileOperationResult + Send + 'static,
) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if let Some(handle) = rfd::AsyncFileDialog::new()
            .add_filter(filter, &[extension])
            .set_file_name(&file_name)
            .save_file()
            .await
        {
            let path = handle.path();
            let result = match std::fs::write(path, &bytes) {
                Ok(_) => on_saved(path.display().to_string()),
                Err(e) => FileOperationResult::OperationFailed(format!("Failed to save file: {}", e)),
            };
            let _ = sender.send(AppEvent::File(result));
        }
        ctx.request_repaint();
    });
}

fn spawn_open(
    ctx: &egui::Context,
    sender: Sender<AppEvent>,
    (filter, extension): (&'static str, &'static str),
    on_loaded: impl FnOnce(String, String) -> FileOperationResult + Send + 'static,
) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if let Some(handle) = rfd::AsyncFileDialog::new()
            .add_filter(filter, &[extension])
            .pick_file()
            .await
        {
            let path = handle.path();
            let result = match std::fs::read_to_string(path) {
                Ok(content) => on_loaded(path.display().to_string(), content),
                Err(e) => FileOperationResult::OperationFailed(format!("Failed to read file: {}", e)),
            };
            let _ = sender.send(AppEvent::File(result));
        }
        ctx.request_repaint();
    });
}
