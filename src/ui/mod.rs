//! User interface for the pillar grid preview.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main PreviewApp
//! - `backend` - Where preview and artifact requests are sent
//! - `sync` - Event handling and scheduler pumping
//! - `rendering` - Painting display lists with egui
//! - `export` - SVG and PNG export of the preview
//! - `file_ops` - File dialogs for documents, images and STL files

mod backend;
mod export;
mod file_ops;
mod rendering;
mod state;
mod sync;

#[cfg(test)]
mod tests;

use std::ops::RangeInclusive;

pub use backend::{GeometryBackend, HttpBackend};
pub use state::{AppEvent, FileOperationResult, PendingFileOperation, PreviewApp, StatusKind};

use crate::types::{Axis, LayoutType, ParamKey};
use eframe::egui;

/// A slider bound to one numeric parameter.
struct ParameterField {
    key: ParamKey,
    label: &'static str,
    range: RangeInclusive<f64>,
}

const fn field(key: ParamKey, label: &'static str, min: f64, max: f64) -> ParameterField {
    ParameterField {
        key,
        label,
        range: min..=max,
    }
}

const GRID_FIELDS: [ParameterField; 3] = [
    field(ParamKey::Rows, "Rows", 1.0, 100.0),
    field(ParamKey::Cols, "Columns", 1.0, 100.0),
    field(ParamKey::Spacing, "Spacing (mm)", 0.05, 5.0),
];

const GEOMETRY_FIELDS: [ParameterField; 3] = [
    field(ParamKey::PillarRadius, "Pillar radius (mm)", 0.01, 2.0),
    field(ParamKey::PillarHeight, "Pillar height (mm)", 0.5, 50.0),
    field(ParamKey::HoleRadius, "Hole radius (mm)", 0.01, 2.0),
];

const FLOOR_FIELDS: [ParameterField; 4] = [
    field(ParamKey::FloorThickness, "Floor thickness (mm)", 0.0, 10.0),
    field(ParamKey::FloorPaddingX, "Padding X (mm)", -5.0, 10.0),
    field(ParamKey::FloorPaddingY, "Padding Y (mm)", -5.0, 10.0),
    field(ParamKey::WallThickness, "Wall thickness (mm)", 0.0, 10.0),
];

const ORGANIC_FIELDS: [ParameterField; 2] = [
    field(ParamKey::Jitter, "Jitter (mm)", 0.0, 1.0),
    field(ParamKey::HoleProbability, "Hole probability", 0.0, 1.0),
];

const VORONOI_FIELDS: [ParameterField; 2] = [
    field(ParamKey::LloydIterations, "Relaxation iterations", 0.0, 20.0),
    field(ParamKey::HoleProbability, "Hole probability", 0.0, 1.0),
];

impl eframe::App for PreviewApp {
    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

impl PreviewApp {
    /// Runs one frame: applies finished work, draws the panels and issues
    /// whatever fetch has become due.
    pub fn show(&mut self, ctx: &egui::Context) {
        ctx.set_visuals(egui::Visuals::light());
        let now = ctx.input(|i| i.time);

        self.handle_events(ctx, now);
        self.handle_pending_operations(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, now);
        });

        egui::SidePanel::right("parameters_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                self.draw_parameters_panel(ui, now);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });

        self.pump(ctx, now);
    }

    fn request_file_operation(&mut self, ui: &egui::Ui, operation: PendingFileOperation) {
        self.pending_file_operation = Some(operation);
        ui.ctx().request_repaint();
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui, now: f64) {
        ui.horizontal(|ui| {
            let can_generate = self.generating_since.is_none();
            if ui
                .add_enabled(can_generate, egui::Button::new("Generate STL"))
                .clicked()
            {
                self.start_generate(ui.ctx(), now);
            }

            ui.separator();

            if ui.button("Export Parameters").clicked() {
                self.request_file_operation(ui, PendingFileOperation::ExportParameters);
            }
            if ui.button("Load Parameters").clicked() {
                self.request_file_operation(ui, PendingFileOperation::ImportParameters);
            }
            if ui.button("Export Image").clicked() {
                self.request_file_operation(ui, PendingFileOperation::ExportImage);
            }

            ui.separator();

            ui.add(
                egui::Slider::new(&mut self.view.zoom, 0.1..=2.0)
                    .text("Zoom")
                    .custom_formatter(|v, _| format!("{:.0}%", v * 100.0)),
            );
            ui.checkbox(&mut self.view.show_measurements, "Show measurements");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some((text, kind)) = self.status_text(now) {
                    ui.colored_label(kind.color(), text);
                }
            });
        });
    }

    fn draw_parameters_panel(&mut self, ui: &mut egui::Ui, now: f64) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Layout");
            let mut layout = self.store.parameters().layout_type;
            egui::ComboBox::from_id_salt("layout_type")
                .selected_text(layout.label())
                .show_ui(ui, |ui| {
                    for option in LayoutType::ALL {
                        ui.selectable_value(&mut layout, option, option.label());
                    }
                });
            if layout != self.store.parameters().layout_type {
                self.edit(ParamKey::LayoutType, layout, now);
            }
            self.draw_fields(ui, &GRID_FIELDS, now);

            ui.separator();
            ui.heading("Pillars & Holes");
            self.draw_fields(ui, &GEOMETRY_FIELDS, now);

            ui.separator();
            ui.heading("Floor & Walls");
            self.draw_fields(ui, &FLOOR_FIELDS, now);
            ui.checkbox(&mut self.view.link_padding, "Link X/Y padding");

            if layout.is_organic() {
                ui.separator();
                ui.heading("Organic");
                self.draw_fields(ui, &ORGANIC_FIELDS, now);
                self.draw_seed(ui, now);
            }
            if layout.is_voronoi() {
                ui.separator();
                ui.heading("Voronoi");
                self.draw_fields(ui, &VORONOI_FIELDS, now);
                self.draw_seed(ui, now);
            }

            ui.separator();
            ui.heading("Dimension Locks");
            self.draw_locks(ui, now);

            ui.separator();
            ui.heading("Statistics");
            self.draw_statistics(ui);

            ui.separator();
            ui.heading("Measurement Style");
            self.draw_style_controls(ui);
        });
    }

    fn draw_fields(&mut self, ui: &mut egui::Ui, fields: &[ParameterField], now: f64) {
        for field in fields {
            let mut value = self.store.parameters().number(field.key);
            let mut slider = egui::Slider::new(&mut value, field.range.clone())
                .text(field.label)
                .clamping(egui::SliderClamping::Never);
            slider = if field.key.is_integer() {
                slider.integer()
            } else {
                slider.max_decimals(5)
            };
            if ui.add(slider).changed() {
                match field.key {
                    ParamKey::FloorPaddingX => self.edit_padding(Axis::Width, value, now),
                    ParamKey::FloorPaddingY => self.edit_padding(Axis::Height, value, now),
                    key => self.edit(key, value, now),
                }
            }
        }
    }

    fn draw_seed(&mut self, ui: &mut egui::Ui, now: f64) {
        ui.horizontal(|ui| {
            ui.label("Random seed");
            let response = ui.add(egui::TextEdit::singleline(&mut self.form.seed).desired_width(90.0));
            if response.lost_focus() {
                self.commit_seed(now);
            }
        });
    }

    fn draw_locks(&mut self, ui: &mut egui::Ui, now: f64) {
        for axis in Axis::BOTH {
            let title = match axis {
                Axis::Width => "Width",
                Axis::Height => "Height",
            };
            ui.horizontal(|ui| {
                let buffer = match axis {
                    Axis::Width => &mut self.form.target_width,
                    Axis::Height => &mut self.form.target_height,
                };
                ui.add(
                    egui::TextEdit::singleline(buffer)
                        .hint_text("target mm")
                        .desired_width(80.0),
                );

                let locked = self.store.is_locked(axis);
                let (text, fill) = if locked {
                    (format!("Unlock {}", title), egui::Color32::from_rgb(231, 76, 60))
                } else {
                    (format!("Lock {}", title), egui::Color32::from_rgb(74, 144, 226))
                };
                let button = egui::Button::new(egui::RichText::new(text).color(egui::Color32::WHITE)).fill(fill);
                if ui.add(button).clicked() {
                    self.toggle_lock(axis, now);
                }
                if let Some(target) = self.store.lock_target(axis) {
                    ui.label(format!("{:.3} mm", target));
                }
            });
        }
    }

    fn draw_statistics(&self, ui: &mut egui::Ui) {
        let Some(stats) = self.store.statistics() else {
            ui.label("No preview yet");
            return;
        };
        egui::Grid::new("statistics_grid")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label("Pillars");
                ui.label(stats.pillar_count.to_string());
                ui.end_row();
                ui.label("Holes");
                ui.label(stats.hole_count.to_string());
                ui.end_row();
                ui.label("Inner floor");
                ui.label(format!("{:.2} × {:.2} mm", stats.inner_width, stats.inner_height));
                ui.end_row();
                ui.label("Total outer");
                ui.label(format!("{:.2} × {:.2} mm", stats.total_width, stats.total_height));
                ui.end_row();
                ui.label("Density");
                ui.label(format!("{:.2} pillars/mm²", stats.density));
                ui.end_row();
                ui.label("Total height");
                ui.label(format!("{:.2} mm", stats.total_height_z));
                ui.end_row();
            });
    }

    fn draw_style_controls(&mut self, ui: &mut egui::Ui) {
        let style = self.styles.get_mut();
        ui.add(egui::Slider::new(&mut style.font_size, 6.0..=24.0).text("Font size"));
        ui.add(egui::Slider::new(&mut style.line_width, 0.5..=5.0).text("Line width"));
        ui.add(egui::Slider::new(&mut style.label_opacity, 0.0..=1.0).text("Label opacity"));
        ui.checkbox(&mut style.rotate_vertical_labels, "Rotate vertical labels");

        ui.horizontal(|ui| {
            if ui.button("Reset").clicked() {
                self.styles.reset();
            }
            if ui.button("Load...").clicked() {
                self.request_file_operation(ui, PendingFileOperation::LoadStyles);
            }
            if ui.button("Save...").clicked() {
                self.request_file_operation(ui, PendingFileOperation::SaveStyles);
            }
        });
    }
}
