//! Measurement overlay: spacing dimension, radius indicators and brackets.

use eframe::egui::{Color32, Pos2, Rect, Stroke, Vec2};

use super::{Frame, Label, Primitive, RenderInput, TextAnchor, TextMeasure, Transform};
use crate::constants;
use crate::style::MeasurementStyle;
use crate::types::Point;

/// First pair of neighbouring pillars, in (y, x) order, whose distance is
/// within [`constants::SPACING_MATCH_TOLERANCE`] of `spacing`.
pub fn find_spacing_pair(pillars: &[Point], spacing: f64) -> Option<(Point, Point)> {
    let mut sorted = pillars.to_vec();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    sorted
        .windows(2)
        .find(|pair| (pair[0].distance(&pair[1]) - spacing).abs() < constants::SPACING_MATCH_TOLERANCE)
        .map(|pair| (pair[0], pair[1]))
}

pub(super) fn draw_overlay(
    frame: &mut Frame,
    input: &RenderInput<'_>,
    transform: &Transform,
    text: &dyn TextMeasure,
) {
    let geometry = input.geometry;
    let params = input.params;
    let style = input.style;
    if geometry.pillars.len() < 2 {
        return;
    }

    let mut painter = OverlayPainter { frame, style, text };

    if let Some((a, b)) = find_spacing_pair(&geometry.pillars, params.spacing) {
        painter.dimension_line(
            transform.apply(a),
            transform.apply(b),
            format!("Spacing: {:.3} mm", params.spacing),
        );
    }

    if let Some(pillar) = geometry.pillars.first() {
        painter.radius_line(
            transform.apply(*pillar),
            transform.length(params.pillar_radius),
            format!("Pillar r={:.3} mm", params.pillar_radius),
            constants::PILLAR_RADIUS_ANGLE_DEG,
        );
    }
    if let Some(hole) = geometry.holes.first() {
        painter.radius_line(
            transform.apply(*hole),
            transform.length(params.hole_radius),
            format!("Hole r={:.3} mm", params.hole_radius),
            constants::HOLE_RADIUS_ANGLE_DEG,
        );
    }

    let bounds = &geometry.bounds;
    let floor_left = transform.x(bounds.min_x);
    let floor_top = transform.y(bounds.min_y);
    let points = geometry.pillars.iter().chain(geometry.holes.iter());
    let (min_x, min_y) = points.fold((f64::INFINITY, f64::INFINITY), |(x, y), p| {
        (x.min(p.x), y.min(p.y))
    });
    let leftmost = transform.x(min_x);
    let topmost = transform.y(min_y);

    if params.floor_padding_x.abs() > constants::MIN_ANNOTATED_PADDING {
        let y = floor_top + style.pad_x_offset;
        painter.bracket(
            Pos2::new(floor_left, y),
            Pos2::new(leftmost, y),
            format!("Pad X: {:.3} mm", params.floor_padding_x.abs()),
        );
    }
    if params.floor_padding_y.abs() > constants::MIN_ANNOTATED_PADDING {
        let x = floor_left + style.pad_y_offset;
        painter.bracket(
            Pos2::new(x, floor_top),
            Pos2::new(x, topmost),
            format!("Pad Y: {:.3} mm", params.floor_padding_y.abs()),
        );
    }
    if params.wall_thickness > 0.0 {
        let y = floor_top + transform.length(bounds.height()) / 2.0;
        painter.bracket(
            Pos2::new(floor_left - transform.length(params.wall_thickness), y),
            Pos2::new(floor_left, y),
            format!("Wall: {:.2} mm", params.wall_thickness),
        );
    }
}

struct OverlayPainter<'a> {
    frame: &'a mut Frame,
    style: &'a MeasurementStyle,
    text: &'a dyn TextMeasure,
}

impl OverlayPainter<'_> {
    fn dimension_line(&mut self, from: Pos2, to: Pos2, text: String) {
        let style = self.style;
        let color = style.dimension_color32();
        let stroke = Stroke::new(style.line_width, color);

        let d = to - from;
        let length = d.length();
        if !(length > 0.0) {
            return;
        }
        let perp = Vec2::new(-d.y, d.x) / length * style.measurement_offset;
        let start = from + perp;
        let end = to + perp;
        self.frame.line(start, end, stroke);

        // Arrowheads
        let unit = (end - start).normalized();
        let angle = constants::ARROW_ANGLE_DEG.to_radians() as f32;
        let (sin, cos) = angle.sin_cos();
        let wing_a = Vec2::new(unit.x * cos + unit.y * sin, unit.y * cos - unit.x * sin) * style.cap_size;
        let wing_b = Vec2::new(unit.x * cos - unit.y * sin, unit.y * cos + unit.x * sin) * style.cap_size;
        self.frame.line(start, start + wing_a, stroke);
        self.frame.line(start, start + wing_b, stroke);
        self.frame.line(end, end - wing_a, stroke);
        self.frame.line(end, end - wing_b, stroke);

        // Extension lines
        self.frame.dashed_line(from, start, stroke, &style.dash_pattern);
        self.frame.dashed_line(to, end, stroke, &style.dash_pattern);

        let mid = start + (end - start) / 2.0 + Vec2::new(0.0, style.spacing_label_offset);
        self.label(mid, text, color, false);
    }

    fn radius_line(&mut self, center: Pos2, radius: f32, text: String, angle_deg: f64) {
        let style = self.style;
        let color = style.dimension_color32();
        let (sin, cos) = (angle_deg.to_radians() as f32).sin_cos();
        let direction = Vec2::new(cos, sin);

        self.frame
            .line(center, center + direction * radius, Stroke::new(style.line_width, color));
        self.frame.push(Primitive::Circle {
            center,
            radius: style.dot_size,
            fill: color,
        });
        self.label(center + direction * (radius + style.label_offset), text, color, false);
    }

    fn bracket(&mut self, from: Pos2, to: Pos2, text: String) {
        let style = self.style;
        let color = style.bracket_color32();
        let stroke = Stroke::new(style.line_width, color);
        let horizontal = (to.y - from.y).abs() < (to.x - from.x).abs();
        let half = style.bracket_size / 2.0;

        self.frame.line(from, to, stroke);
        let tick = if horizontal {
            Vec2::new(0.0, half)
        } else {
            Vec2::new(half, 0.0)
        };
        for end in [from, to] {
            self.frame.line(end - tick, end + tick, stroke);
        }

        let mut pos = from + (to - from) / 2.0;
        if horizontal {
            pos.y -= style.bracket_label_offset;
            self.label(pos, text, color, false);
        } else {
            pos.x -= style.bracket_label_offset;
            self.label(pos, text, color, style.rotate_vertical_labels);
        }
    }

    fn label(&mut self, pos: Pos2, text: String, color: Color32, vertical: bool) {
        let style = self.style;
        let bold = style.is_bold();
        if style.label_opacity > 0.0 {
            let width = self.text.text_width(&text, style.font_size, bold);
            let along = width + 2.0 * style.label_padding;
            let across = style.font_size + 4.0;
            let size = if vertical {
                Vec2::new(across, along)
            } else {
                Vec2::new(along, across)
            };
            self.frame.push(Primitive::Rect {
                rect: Rect::from_center_size(pos, size),
                fill: style.label_plate_color32(),
                stroke: None,
            });
        }
        self.frame.push(Primitive::Text(Label {
            pos,
            text,
            size: style.font_size,
            bold,
            color,
            anchor: TextAnchor::Middle,
            vertical,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_preview, ApproxMeasure};
    use crate::types::{Bounds, Parameters, PreviewGeometry};

    fn input_frame(geometry: &PreviewGeometry, params: &Parameters, style: &MeasurementStyle) -> Frame {
        let input = RenderInput {
            geometry,
            params,
            style,
            viewport: Vec2::new(400.0, 400.0),
            zoom: 0.85,
            show_measurements: true,
        };
        render_preview(&input, &ApproxMeasure)
    }

    fn bounds() -> Bounds {
        Bounds {
            min_x: 0.0,
            max_x: 10.0,
            min_y: 0.0,
            max_y: 5.0,
        }
    }

    #[test]
    fn test_spacing_pair_selects_matching_neighbours() {
        let pillars = [Point::new(0.0, 0.0), Point::new(0.35, 0.0), Point::new(1.0, 1.0)];
        let (a, b) = find_spacing_pair(&pillars, 0.35).unwrap();
        assert_eq!(a, Point::new(0.0, 0.0));
        assert_eq!(b, Point::new(0.35, 0.0));
    }

    #[test]
    fn test_spacing_pair_sorts_by_row_then_column() {
        let pillars = [Point::new(5.0, 1.0), Point::new(0.7, 0.0), Point::new(0.0, 1.0), Point::new(0.35, 0.0)];
        let (a, b) = find_spacing_pair(&pillars, 0.35).unwrap();
        assert_eq!(a, Point::new(0.35, 0.0));
        assert_eq!(b, Point::new(0.7, 0.0));
        assert!(find_spacing_pair(&pillars, 2.0).is_none());
    }

    #[test]
    fn test_overlay_skipped_with_fewer_than_two_pillars() {
        let geometry = PreviewGeometry {
            pillars: vec![Point::new(1.0, 1.0)],
            holes: vec![Point::new(2.0, 2.0)],
            bounds: bounds(),
        };
        let frame = input_frame(&geometry, &Parameters::default(), &MeasurementStyle::default());
        assert_eq!(frame.labels().count(), 0);
    }

    #[test]
    fn test_overlay_labels() {
        let geometry = PreviewGeometry {
            pillars: vec![Point::new(0.25, 0.25), Point::new(0.6, 0.25)],
            holes: vec![Point::new(0.25, 0.6)],
            bounds: bounds(),
        };
        let params = Parameters {
            floor_padding_x: -0.5,
            floor_padding_y: 0.0,
            ..Parameters::default()
        };
        let frame = input_frame(&geometry, &params, &MeasurementStyle::default());
        let texts: Vec<&str> = frame.labels().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Spacing: 0.350 mm",
                "Pillar r=0.125 mm",
                "Hole r=0.100 mm",
                "Pad X: 0.500 mm",
                "Wall: 2.00 mm",
            ]
        );
    }

    #[test]
    fn test_plates_follow_opacity() {
        let geometry = PreviewGeometry {
            pillars: vec![Point::new(0.25, 0.25), Point::new(0.6, 0.25)],
            holes: Vec::new(),
            bounds: bounds(),
        };
        let params = Parameters::default();

        let opaque = input_frame(&geometry, &params, &MeasurementStyle::default());
        let clear = input_frame(&geometry, &params, &MeasurementStyle::presentation());
        let rects = |f: &Frame| f.census().0;
        // five layer rects plus one plate per label
        assert_eq!(rects(&opaque), 5 + opaque.labels().count());
        assert_eq!(rects(&clear), 5);
    }

    #[test]
    fn test_vertical_bracket_label_rotates() {
        let geometry = PreviewGeometry {
            pillars: vec![Point::new(0.25, 0.25), Point::new(0.6, 0.25)],
            holes: Vec::new(),
            bounds: bounds(),
        };
        let mut style = MeasurementStyle::default();
        let frame = input_frame(&geometry, &Parameters::default(), &style);
        let pad_y = frame.labels().find(|l| l.text.starts_with("Pad Y")).unwrap();
        assert!(pad_y.vertical);

        style.rotate_vertical_labels = false;
        let frame = input_frame(&geometry, &Parameters::default(), &style);
        let pad_y = frame.labels().find(|l| l.text.starts_with("Pad Y")).unwrap();
        assert!(!pad_y.vertical);
    }

    #[test]
    fn test_dimension_line_is_offset_perpendicular() {
        let mut frame = Frame::new(Vec2::new(100.0, 100.0));
        let style = MeasurementStyle::default();
        let mut painter = OverlayPainter {
            frame: &mut frame,
            style: &style,
            text: &ApproxMeasure,
        };
        painter.dimension_line(Pos2::new(10.0, 50.0), Pos2::new(60.0, 50.0), "d".into());

        let Primitive::Line { points, .. } = &frame.primitives[0] else {
            panic!("main line first");
        };
        // offset -40 along (0, 1) moves the line up
        assert_eq!(points[0], Pos2::new(10.0, 10.0));
        assert_eq!(points[1], Pos2::new(60.0, 10.0));
        let dashed = frame
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Line { dash, .. } if !dash.is_empty()))
            .count();
        assert_eq!(dashed, 2);
    }
}
