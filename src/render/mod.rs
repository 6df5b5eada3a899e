//! Pure rendering of preview geometry into a display list.
//!
//! Nothing in this module touches a drawing surface. [`render_preview`] and
//! [`render_profile`] turn geometry, parameters and style into a [`Frame`]
//! of screen-space [`Primitive`]s; the UI paints frames with egui and the
//! image exporter writes them out as SVG.

mod measure;
mod preview;
mod profile;

use eframe::egui::{Color32, Pos2, Rect, Stroke, Vec2};

use crate::constants;
use crate::style::MeasurementStyle;
use crate::types::{Bounds, Parameters, Point, PreviewGeometry};

pub use measure::find_spacing_pair;
pub use preview::render_preview;
pub use profile::render_profile;

/// Horizontal placement of a label relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Centred on the anchor
    Middle,
    /// Starts at the anchor
    Start,
}

/// A single line of text, vertically centred on `pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Anchor point (px)
    pub pos: Pos2,
    /// Text content
    pub text: String,
    /// Font size (px)
    pub size: f32,
    /// Bold face
    pub bold: bool,
    /// Text colour
    pub color: Color32,
    /// Horizontal placement
    pub anchor: TextAnchor,
    /// Rotated a quarter turn counter-clockwise about `pos`
    pub vertical: bool,
}

/// Screen-space drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned rectangle
    Rect {
        /// Extent (px)
        rect: Rect,
        /// Fill colour, transparent for outline-only
        fill: Color32,
        /// Optional outline
        stroke: Option<Stroke>,
    },
    /// Filled disk
    Circle {
        /// Centre (px)
        center: Pos2,
        /// Radius (px)
        radius: f32,
        /// Fill colour
        fill: Color32,
    },
    /// Straight segment, optionally dashed
    Line {
        /// Endpoints (px)
        points: [Pos2; 2],
        /// Width and colour
        stroke: Stroke,
        /// Alternating dash and gap lengths; solid when empty
        dash: Vec<f32>,
    },
    /// Text label
    Text(Label),
}

impl Primitive {
    /// The same primitive moved by `offset`.
    pub fn translated(&self, offset: Vec2) -> Primitive {
        match self {
            Primitive::Rect { rect, fill, stroke } => Primitive::Rect {
                rect: rect.translate(offset),
                fill: *fill,
                stroke: *stroke,
            },
            Primitive::Circle { center, radius, fill } => Primitive::Circle {
                center: *center + offset,
                radius: *radius,
                fill: *fill,
            },
            Primitive::Line { points, stroke, dash } => Primitive::Line {
                points: [points[0] + offset, points[1] + offset],
                stroke: *stroke,
                dash: dash.clone(),
            },
            Primitive::Text(label) => Primitive::Text(Label {
                pos: label.pos + offset,
                ..label.clone()
            }),
        }
    }
}

/// Display list for one drawing surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Surface size (px)
    pub size: Vec2,
    /// Primitives in painting order
    pub primitives: Vec<Primitive>,
}

impl Frame {
    /// Creates an empty frame of the given size.
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            primitives: Vec::new(),
        }
    }

    fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.push(Primitive::Line {
            points: [from, to],
            stroke,
            dash: Vec::new(),
        });
    }

    fn dashed_line(&mut self, from: Pos2, to: Pos2, stroke: Stroke, dash: &[f32]) {
        self.push(Primitive::Line {
            points: [from, to],
            stroke,
            dash: dash.to_vec(),
        });
    }

    /// Places `inset` in the top-right corner on an opaque backdrop.
    pub fn compose_inset(&mut self, inset: &Frame) {
        let origin = Pos2::new(
            self.size.x - inset.size.x - constants::PROFILE_MARGIN,
            constants::PROFILE_MARGIN,
        );
        self.push(Primitive::Rect {
            rect: Rect::from_min_size(origin, inset.size),
            fill: rgba(constants::PROFILE_BACKDROP),
            stroke: Some(Stroke::new(1.0, rgba(constants::PROFILE_BACKDROP_STROKE))),
        });
        let offset = origin.to_vec2();
        self.primitives
            .extend(inset.primitives.iter().map(|p| p.translated(offset)));
    }

    /// Labels in painting order.
    #[cfg(test)]
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(label) => Some(label),
            _ => None,
        })
    }

    /// Number of primitives of each kind: (rects, circles, lines, labels).
    #[cfg(test)]
    pub fn census(&self) -> (usize, usize, usize, usize) {
        self.primitives
            .iter()
            .fold((0, 0, 0, 0), |(r, c, l, t), p| match p {
                Primitive::Rect { .. } => (r + 1, c, l, t),
                Primitive::Circle { .. } => (r, c + 1, l, t),
                Primitive::Line { .. } => (r, c, l + 1, t),
                Primitive::Text(_) => (r, c, l, t + 1),
            })
    }
}

/// Measures rendered text so that label plates fit their content.
pub trait TextMeasure {
    /// Width in pixels of `text` at `size`.
    fn text_width(&self, text: &str, size: f32, bold: bool) -> f32;
}

/// Fixed-advance estimate for tests that run without a font system.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

#[cfg(test)]
impl TextMeasure for ApproxMeasure {
    fn text_width(&self, text: &str, size: f32, bold: bool) -> f32 {
        let advance = if bold { 0.62 } else { 0.56 };
        text.chars().count() as f32 * size * advance
    }
}

/// Uniform model-to-screen mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Pixels per model unit
    pub scale: f64,
    /// Horizontal offset (px)
    pub offset_x: f64,
    /// Vertical offset (px)
    pub offset_y: f64,
}

impl Transform {
    /// Fits the walled floor into `viewport` at `zoom`, centring the inner box.
    ///
    /// A non-positive or non-finite outer extent falls back to unit scale.
    pub fn fit(bounds: &Bounds, wall_thickness: f64, viewport: Vec2, zoom: f64) -> Self {
        let total_width = bounds.width() + 2.0 * wall_thickness;
        let total_height = bounds.height() + 2.0 * wall_thickness;
        let extent = total_width.max(total_height);
        let mut scale = (viewport.x.min(viewport.y) as f64) * zoom / extent;
        if !(extent > 0.0) || !scale.is_finite() {
            scale = 1.0;
        }

        let center = bounds.center();
        Self {
            scale,
            offset_x: viewport.x as f64 / 2.0 - center.x * scale,
            offset_y: viewport.y as f64 / 2.0 - center.y * scale,
        }
    }

    /// Screen x of a model x.
    pub fn x(&self, x: f64) -> f32 {
        (x * self.scale + self.offset_x) as f32
    }

    /// Screen y of a model y.
    pub fn y(&self, y: f64) -> f32 {
        (y * self.scale + self.offset_y) as f32
    }

    /// Screen position of a model point.
    pub fn apply(&self, p: Point) -> Pos2 {
        Pos2::new(self.x(p.x), self.y(p.y))
    }

    /// Screen length of a model length.
    pub fn length(&self, d: f64) -> f32 {
        (d * self.scale) as f32
    }
}

/// Everything [`render_preview`] draws from.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// Geometry to draw
    pub geometry: &'a PreviewGeometry,
    /// Parameters the geometry was requested with
    pub params: &'a Parameters,
    /// Measurement overlay style
    pub style: &'a MeasurementStyle,
    /// Surface size (px)
    pub viewport: Vec2,
    /// Zoom factor applied on top of the fit
    pub zoom: f32,
    /// Whether to draw the measurement overlay
    pub show_measurements: bool,
}

fn rgba(c: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}
