//! Painting display lists with egui.
//!
//! Frames are built in their own pixel space starting at the origin; the
//! painter shifts them onto the canvas rectangle.

use std::f32::consts::FRAC_PI_2;

use eframe::egui;
use eframe::epaint::{StrokeKind, TextShape};

use super::state::PreviewApp;
use crate::render::{self, Frame, Label, Primitive, RenderInput, TextAnchor, TextMeasure};

/// Text metrics from the egui font system.
pub struct EguiMeasure<'a> {
    ctx: &'a egui::Context,
}

impl<'a> EguiMeasure<'a> {
    /// Measures with the fonts of `ctx`.
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for EguiMeasure<'_> {
    fn text_width(&self, text: &str, size: f32, bold: bool) -> f32 {
        let font_id = egui::FontId::proportional(size);
        let width = self.ctx.fonts_mut(|f| {
            f.layout_no_wrap(text.to_string(), font_id, egui::Color32::BLACK)
                .size()
                .x
        });
        if bold {
            width + BOLD_OFFSET
        } else {
            width
        }
    }
}

// egui ships no bold face; bold labels are drawn twice, shifted by this much.
const BOLD_OFFSET: f32 = 0.6;

impl PreviewApp {
    /// Builds the frame shown on the canvas and written by image export.
    ///
    /// `None` until the first geometry arrives.
    pub fn build_frame(&self, text: &dyn TextMeasure) -> Option<Frame> {
        let geometry = self.store.preview()?;
        let params = self.store.parameters();
        let input = RenderInput {
            geometry,
            params,
            style: self.styles.get(),
            viewport: self.view.canvas_size,
            zoom: self.view.zoom,
            show_measurements: self.view.show_measurements,
        };
        let mut frame = render::render_preview(&input, text);
        if self.view.show_measurements {
            frame.compose_inset(&render::render_profile(params, self.styles.get()));
        }
        Some(frame)
    }

    /// Draws the preview canvas.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let canvas_rect = response.rect;
        self.view.canvas_size = canvas_rect.size();
        painter.rect_filled(canvas_rect, 0.0, egui::Color32::WHITE);

        match self.build_frame(&EguiMeasure::new(ui.ctx())) {
            Some(frame) => paint_frame(&painter, &frame, canvas_rect.min),
            None => {
                painter.text(
                    canvas_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Waiting for preview...",
                    egui::FontId::proportional(16.0),
                    egui::Color32::from_gray(120),
                );
            }
        }
    }
}

/// Paints every primitive of `frame` with its origin at `origin`.
pub fn paint_frame(painter: &egui::Painter, frame: &Frame, origin: egui::Pos2) {
    let offset = origin.to_vec2();
    for primitive in &frame.primitives {
        match primitive.translated(offset) {
            Primitive::Rect { rect, fill, stroke } => {
                if fill != egui::Color32::TRANSPARENT {
                    painter.rect_filled(rect, 0.0, fill);
                }
                if let Some(stroke) = stroke {
                    painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Inside);
                }
            }
            Primitive::Circle { center, radius, fill } => {
                painter.circle_filled(center, radius, fill);
            }
            Primitive::Line { points, stroke, dash } => match dash.as_slice() {
                [] => {
                    painter.line_segment(points, stroke);
                }
                [on, rest @ ..] => {
                    let off = rest.first().copied().unwrap_or(*on);
                    painter.extend(egui::Shape::dashed_line(&points, stroke, *on, off));
                }
            },
            Primitive::Text(label) => paint_label(painter, &label),
        }
    }
}

fn paint_label(painter: &egui::Painter, label: &Label) {
    let passes: &[f32] = if label.bold { &[0.0, BOLD_OFFSET] } else { &[0.0] };
    for &dx in passes {
        let galley = painter.layout_no_wrap(
            label.text.clone(),
            egui::FontId::proportional(label.size),
            label.color,
        );
        let size = galley.size();
        let lead = match label.anchor {
            TextAnchor::Middle => size.x / 2.0,
            TextAnchor::Start => 0.0,
        };
        // Text shapes rotate about their top-left corner.
        let (pos, angle) = if label.vertical {
            (
                egui::pos2(label.pos.x - size.y / 2.0 + dx, label.pos.y + lead),
                -FRAC_PI_2,
            )
        } else {
            (
                egui::pos2(label.pos.x - lead + dx, label.pos.y - size.y / 2.0),
                0.0,
            )
        };
        painter.add(TextShape::new(pos, galley, label.color).with_angle(angle));
    }
}
