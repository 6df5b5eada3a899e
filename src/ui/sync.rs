//! Keeps the preview in step with the parameters.
//!
//! Every frame drains finished requests, lets the scheduler issue the next
//! fetch and asks egui to wake up again when a timer falls due.

use std::time::Duration;

use eframe::egui;

use super::state::{AppEvent, PendingFileOperation, PreviewApp, StatusKind};
use crate::constants;
use crate::scheduler::Completion;
use crate::types::{parse_leading_float, parse_leading_int, Axis, ParamKey, ParamValue};

impl PreviewApp {
    /// Assigns a parameter and schedules a preview update.
    pub fn edit(&mut self, key: ParamKey, value: impl Into<ParamValue>, now: f64) {
        self.store.set_parameter(key, value);
        self.scheduler.request_update(now);
    }

    /// Assigns a padding, honouring the link flag, and schedules an update.
    pub fn edit_padding(&mut self, axis: Axis, value: f64, now: f64) {
        self.store.set_padding(axis, value, self.view.link_padding);
        self.scheduler.request_update(now);
    }

    /// Applies the typed seed if it differs from the stored one.
    pub fn commit_seed(&mut self, now: f64) {
        let typed = parse_leading_int(&self.form.seed);
        let stored = self.store.parameters().seed;
        if typed == stored || (typed.is_nan() && stored.is_nan()) {
            return;
        }
        self.edit(ParamKey::Seed, ParamValue::Text(self.form.seed.clone()), now);
    }

    /// Toggles the lock on `axis` using the typed target.
    pub fn toggle_lock(&mut self, axis: Axis, now: f64) {
        let typed = match axis {
            Axis::Width => &self.form.target_width,
            Axis::Height => &self.form.target_height,
        };
        let target = parse_leading_float(typed);
        if self.store.toggle_lock(axis, target) {
            log::info!(
                "{} lock {}",
                axis.name(),
                if self.store.is_locked(axis) { "set" } else { "cleared" }
            );
            self.scheduler.request_update(now);
        } else if self.store.preview().is_none() {
            self.status.error("Wait for the preview before locking", now);
        } else {
            self.status.error(format!("Enter a target {} in mm", axis.name()), now);
        }
    }

    /// Requests the STL for the current parameters.
    pub fn start_generate(&mut self, ctx: &egui::Context, now: f64) {
        if self.generating_since.is_some() {
            return;
        }
        self.generating_since = Some(now);
        self.backend
            .generate_artifact(ctx, self.store.api_parameters(), self.events.clone());
    }

    /// Applies every event that arrived since the last frame.
    pub fn handle_events(&mut self, ctx: &egui::Context, now: f64) {
        while let Ok(event) = self.inbox.try_recv() {
            match event {
                AppEvent::Preview {
                    generation,
                    stage,
                    result,
                } => {
                    let completion =
                        self.scheduler
                            .complete(now, generation, stage, result, &mut self.store);
                    match completion {
                        Completion::Stale | Completion::Accepted => {}
                        Completion::Failed(err) => self.status.error(format!("Error: {}", err), now),
                        Completion::Correct(ticket) => {
                            self.backend.fetch_preview(ctx, ticket, self.events.clone());
                        }
                    }
                }
                AppEvent::Generated(result) => {
                    self.generating_since = None;
                    match result {
                        Ok(artifact) => {
                            self.pending_file_operation =
                                Some(PendingFileOperation::SaveArtifact(artifact));
                        }
                        Err(err) => {
                            log::warn!("Generation failed: {}", err);
                            self.status.error(format!("Error: {}", err), now);
                        }
                    }
                }
                AppEvent::File(result) => self.apply_file_result(result, now),
            }
        }
    }

    /// Dispatches the next due fetch and schedules the wake-ups it needs.
    pub fn pump(&mut self, ctx: &egui::Context, now: f64) {
        if let Some(ticket) = self.scheduler.poll(now, &self.store) {
            self.backend.fetch_preview(ctx, ticket, self.events.clone());
        }

        if let Some(due) = self.scheduler.deadline() {
            ctx.request_repaint_after(Duration::from_secs_f64((due - now).max(0.0)));
        }
        if self.generating_since.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if let Some(expiry) = self.status.expires_at().filter(|t| *t > now) {
            ctx.request_repaint_after(Duration::from_secs_f64(expiry - now));
        }
    }

    /// Text for the status line at `now`.
    ///
    /// Generation progress wins over messages, and messages win over the
    /// updating indicator.
    pub fn status_text(&self, now: f64) -> Option<(String, StatusKind)> {
        if let Some(start) = self.generating_since {
            return Some((
                format!("Generating... {:.1}s", (now - start).max(0.0)),
                StatusKind::Info,
            ));
        }
        if let Some((text, kind)) = self.status.current(now) {
            return Some((text.to_string(), kind));
        }
        self.scheduler
            .is_busy()
            .then(|| (constants::UPDATING_STATUS.to_string(), StatusKind::Info))
    }
}
