//! Side profile: the floor block stacked under a pillar, with height dimensions.

use eframe::egui::{Color32, Pos2, Rect, Stroke, Vec2};

use super::{rgba, Frame, Label, Primitive, TextAnchor};
use crate::constants::*;
use crate::style::MeasurementStyle;
use crate::types::Parameters;

/// Draws the side profile for the given floor thickness and pillar height.
///
/// Independent of geometry, zoom and viewport.
pub fn render_profile(params: &Parameters, style: &MeasurementStyle) -> Frame {
    let mut frame = Frame::new(Vec2::new(PROFILE_WIDTH, PROFILE_HEIGHT));
    let floor = params.floor_thickness;
    let pillar = params.pillar_height;
    let total = floor + pillar;
    let scale = if total > 0.0 {
        PROFILE_DRAW_HEIGHT / total
    } else {
        0.0
    };

    let floor_h = (floor * scale) as f32;
    let pillar_h = (pillar * scale) as f32;
    let total_h = (total * scale) as f32;
    let base_y = PROFILE_HEIGHT / 2.0 + total_h / 2.0;
    let floor_top = base_y - floor_h;
    let pillar_top = base_y - total_h;

    let floor_rect = Rect::from_min_size(
        Pos2::new(PROFILE_FLOOR_X, floor_top),
        Vec2::new(PROFILE_FLOOR_WIDTH, floor_h),
    );
    hatch(&mut frame, floor_rect);
    frame.push(Primitive::Rect {
        rect: floor_rect,
        fill: Color32::TRANSPARENT,
        stroke: Some(Stroke::new(1.5, rgba(PROFILE_FLOOR_STROKE))),
    });

    frame.push(Primitive::Rect {
        rect: Rect::from_min_size(
            Pos2::new(
                PROFILE_FLOOR_X + (PROFILE_FLOOR_WIDTH - PROFILE_PILLAR_WIDTH) / 2.0,
                pillar_top,
            ),
            Vec2::new(PROFILE_PILLAR_WIDTH, pillar_h),
        ),
        fill: rgba(PROFILE_PILLAR_FILL),
        stroke: Some(Stroke::new(2.0, rgba(PROFILE_PILLAR_STROKE))),
    });

    let right = PROFILE_FLOOR_X + PROFILE_FLOOR_WIDTH;
    let dimension = Stroke::new(PROFILE_DIMENSION_WIDTH, style.dimension_color32());
    let bracket = Stroke::new(PROFILE_DIMENSION_WIDTH, style.bracket_color32());

    ticked_line(&mut frame, right + 12.0, base_y, floor_top, dimension, &[]);
    frame.push(side_label(
        Pos2::new(right + 20.0, base_y - floor_h / 2.0),
        format!("Floor: {:.1} mm", floor),
        dimension.color,
        TextAnchor::Start,
        false,
    ));

    ticked_line(&mut frame, right + 28.0, floor_top, pillar_top, dimension, &[]);
    frame.push(side_label(
        Pos2::new(right + 36.0, floor_top - pillar_h / 2.0),
        format!("Pillar: {:.1} mm", pillar),
        dimension.color,
        TextAnchor::Start,
        false,
    ));

    ticked_line(&mut frame, PROFILE_FLOOR_X - 20.0, base_y, pillar_top, bracket, &[4.0, 4.0]);
    frame.push(side_label(
        Pos2::new(PROFILE_FLOOR_X - 30.0, base_y - total_h / 2.0),
        format!("Total: {:.1} mm", total),
        bracket.color,
        TextAnchor::Middle,
        true,
    ));

    frame.line(
        Pos2::new(10.0, base_y),
        Pos2::new(PROFILE_WIDTH - 10.0, base_y),
        Stroke::new(2.5, rgba(PROFILE_GROUND_STROKE)),
    );

    frame.push(Primitive::Text(Label {
        pos: Pos2::new(PROFILE_WIDTH / 2.0, PROFILE_HEIGHT - 14.0),
        text: "Side View (mm)".to_string(),
        size: 9.0,
        bold: false,
        color: rgba(PROFILE_CAPTION),
        anchor: TextAnchor::Middle,
        vertical: false,
    }));

    frame
}

/// Vertical dimension line at `x` with short horizontal ticks at both ends.
fn ticked_line(frame: &mut Frame, x: f32, y0: f32, y1: f32, stroke: Stroke, dash: &[f32]) {
    frame.dashed_line(Pos2::new(x, y0), Pos2::new(x, y1), stroke, dash);
    for y in [y0, y1] {
        frame.line(Pos2::new(x - 3.0, y), Pos2::new(x + 3.0, y), stroke);
    }
}

fn side_label(pos: Pos2, text: String, color: Color32, anchor: TextAnchor, vertical: bool) -> Primitive {
    Primitive::Text(Label {
        pos,
        text,
        size: PROFILE_FONT_SIZE,
        bold: true,
        color,
        anchor,
        vertical,
    })
}

/// Diagonal hatching clipped to `rect`, rising left to right.
fn hatch(frame: &mut Frame, rect: Rect) {
    if rect.height() <= 0.0 || rect.width() <= 0.0 {
        return;
    }
    let stroke = Stroke::new(0.5, rgba(PROFILE_HATCH_STROKE));
    // Lines satisfy x + y = c.
    let mut c = rect.min.x + rect.min.y + PROFILE_HATCH_STEP;
    let c_max = rect.max.x + rect.max.y;
    while c < c_max {
        let x_start = (c - rect.max.y).max(rect.min.x);
        let x_end = (c - rect.min.y).min(rect.max.x);
        if x_end > x_start {
            frame.line(Pos2::new(x_start, c - x_start), Pos2::new(x_end, c - x_end), stroke);
        }
        c += PROFILE_HATCH_STEP;
    }
}
