//! Top-down preview: walls, floor, holes, pillars and the optional overlay.

use eframe::egui::{Color32, Pos2, Rect, Stroke};

use super::{measure, rgba, Frame, Primitive, RenderInput, TextMeasure, Transform};
use crate::constants;

/// Draws the preview into a frame the size of the viewport.
///
/// Layers are emitted back to front: wall band, floor outline, holes,
/// pillars, then the measurement overlay when enabled.
pub fn render_preview(input: &RenderInput<'_>, text: &dyn TextMeasure) -> Frame {
    let mut frame = Frame::new(input.viewport);
    let bounds = &input.geometry.bounds;
    let params = input.params;
    let transform = Transform::fit(bounds, params.wall_thickness, input.viewport, input.zoom as f64);

    let inner = Rect::from_min_max(
        Pos2::new(transform.x(bounds.min_x), transform.y(bounds.min_y)),
        Pos2::new(transform.x(bounds.max_x), transform.y(bounds.max_y)),
    );
    let wall = transform.length(params.wall_thickness).max(0.0);

    // Walls
    let wall_stroke = Some(Stroke::new(constants::WALL_STROKE_WIDTH, rgba(constants::WALL_STROKE)));
    let bands = [
        Rect::from_min_max(
            Pos2::new(inner.min.x - wall, inner.min.y - wall),
            Pos2::new(inner.max.x + wall, inner.min.y),
        ),
        Rect::from_min_max(
            Pos2::new(inner.min.x - wall, inner.max.y),
            Pos2::new(inner.max.x + wall, inner.max.y + wall),
        ),
        Rect::from_min_max(Pos2::new(inner.min.x - wall, inner.min.y), Pos2::new(inner.min.x, inner.max.y)),
        Rect::from_min_max(Pos2::new(inner.max.x, inner.min.y), Pos2::new(inner.max.x + wall, inner.max.y)),
    ];
    for rect in bands {
        frame.push(Primitive::Rect {
            rect,
            fill: rgba(constants::WALL_FILL),
            stroke: wall_stroke,
        });
    }

    // Floor
    frame.push(Primitive::Rect {
        rect: inner,
        fill: Color32::TRANSPARENT,
        stroke: Some(Stroke::new(constants::FLOOR_STROKE_WIDTH, rgba(constants::FLOOR_STROKE))),
    });

    let hole_radius = transform.length(params.hole_radius).abs();
    for hole in &input.geometry.holes {
        frame.push(Primitive::Circle {
            center: transform.apply(*hole),
            radius: hole_radius,
            fill: rgba(constants::HOLE_FILL),
        });
    }

    let pillar_radius = transform.length(params.pillar_radius).abs();
    for pillar in &input.geometry.pillars {
        frame.push(Primitive::Circle {
            center: transform.apply(*pillar),
            radius: pillar_radius,
            fill: rgba(constants::PILLAR_FILL),
        });
    }

    if input.show_measurements {
        measure::draw_overlay(&mut frame, input, &transform, text);
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ApproxMeasure;
    use crate::style::MeasurementStyle;
    use crate::types::{Bounds, Parameters, Point, PreviewGeometry};
    use eframe::egui::Vec2;

    fn sample() -> (PreviewGeometry, Parameters) {
        let geometry = PreviewGeometry {
            pillars: vec![Point::new(1.0, 1.0), Point::new(1.35, 1.0), Point::new(2.0, 3.0)],
            holes: vec![Point::new(1.7, 1.0)],
            bounds: Bounds {
                min_x: 0.0,
                max_x: 10.0,
                min_y: 0.0,
                max_y: 5.0,
            },
        };
        let params = Parameters {
            wall_thickness: 1.0,
            ..Parameters::default()
        };
        (geometry, params)
    }

    #[test]
    fn test_layers_in_order() {
        let (geometry, params) = sample();
        let style = MeasurementStyle::default();
        let input = RenderInput {
            geometry: &geometry,
            params: &params,
            style: &style,
            viewport: Vec2::new(400.0, 400.0),
            zoom: 0.85,
            show_measurements: false,
        };
        let frame = render_preview(&input, &ApproxMeasure);
        assert_eq!(frame.census(), (5, 4, 0, 0));

        // Holes precede pillars so pillars occlude them.
        match (&frame.primitives[5], &frame.primitives[6]) {
            (
                Primitive::Circle { fill: hole, radius: hr, .. },
                Primitive::Circle { fill: pillar, radius: pr, .. },
            ) => {
                assert_eq!(*hole, rgba(constants::HOLE_FILL));
                assert_eq!(*pillar, rgba(constants::PILLAR_FILL));
                assert!((hr - 0.10 * 28.333).abs() < 0.01);
                assert!((pr - 0.125 * 28.333).abs() < 0.01);
            }
            other => panic!("unexpected primitives {:?}", other),
        }
    }

    #[test]
    fn test_wall_band_thickness() {
        let (geometry, params) = sample();
        let style = MeasurementStyle::default();
        let input = RenderInput {
            geometry: &geometry,
            params: &params,
            style: &style,
            viewport: Vec2::new(400.0, 400.0),
            zoom: 0.85,
            show_measurements: false,
        };
        let frame = render_preview(&input, &ApproxMeasure);
        let Primitive::Rect { rect: top, .. } = &frame.primitives[0] else {
            panic!("first primitive should be the top wall");
        };
        let Primitive::Rect { rect: floor, .. } = &frame.primitives[4] else {
            panic!("fifth primitive should be the floor");
        };
        assert!((top.height() - 28.333).abs() < 0.01);
        assert!((top.width() - (floor.width() + 2.0 * 28.333)).abs() < 0.05);
        assert!((floor.center().x - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_overlay_only_when_enabled() {
        let (geometry, params) = sample();
        let style = MeasurementStyle::default();
        let mut input = RenderInput {
            geometry: &geometry,
            params: &params,
            style: &style,
            viewport: Vec2::new(400.0, 400.0),
            zoom: 0.85,
            show_measurements: true,
        };
        let with = render_preview(&input, &ApproxMeasure);
        input.show_measurements = false;
        let without = render_preview(&input, &ApproxMeasure);
        assert!(with.primitives.len() > without.primitives.len());
        assert!(with.labels().any(|l| l.text == "Spacing: 0.350 mm"));
    }
}
