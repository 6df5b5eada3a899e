//! Core data types for the pillar grid preview.
//!
//! This module contains the parameter set edited by the user, the geometry
//! returned by the preview service, and the small value types (axes, locks,
//! statistics) shared by the store, scheduler and renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;

/// A point in model space (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Coordinate along the given axis.
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Width => self.x,
            Axis::Height => self.y,
        }
    }
}

/// Inner extent of the floor as reported by the preview service.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// Left edge
    pub min_x: f64,
    /// Right edge
    pub max_x: f64,
    /// Top edge
    pub min_y: f64,
    /// Bottom edge
    pub max_y: f64,
}

impl Bounds {
    /// Inner width (`max_x - min_x`).
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Inner height (`max_y - min_y`).
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Midpoint of the inner box.
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Geometry returned by one successful preview request.
///
/// Replaced wholesale by every accepted response; never edited in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewGeometry {
    /// Pillar centres
    #[serde(default)]
    pub pillars: Vec<Point>,
    /// Hole centres
    #[serde(default)]
    pub holes: Vec<Point>,
    /// Inner floor extent
    pub bounds: Bounds,
}

impl PreviewGeometry {
    /// Raw extent of every pillar and hole along `axis`, or `None` when there
    /// are no points at all.
    pub fn extent(&self, axis: Axis) -> Option<f64> {
        let mut coords = self
            .pillars
            .iter()
            .chain(self.holes.iter())
            .map(|p| p.along(axis));
        let first = coords.next()?;
        let (min, max) = coords.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)));
        Some(max - min)
    }
}

/// Pillar arrangement requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    /// Square grid with alternating holes
    SquareCheckerboard,
    /// Hexagonal grid with alternating holes
    #[default]
    HexCheckerboard,
    /// Hexagonal honeycomb
    HexHoneycomb,
    /// Jittered grid with random holes
    Organic,
    /// Voronoi cells with optional Lloyd relaxation
    Voronoi,
}

impl LayoutType {
    /// Every layout, in the order they are offered to the user.
    pub const ALL: [LayoutType; 5] = [
        LayoutType::SquareCheckerboard,
        LayoutType::HexCheckerboard,
        LayoutType::HexHoneycomb,
        LayoutType::Organic,
        LayoutType::Voronoi,
    ];

    /// Wire name of the layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::SquareCheckerboard => "square-checkerboard",
            LayoutType::HexCheckerboard => "hex-checkerboard",
            LayoutType::HexHoneycomb => "hex-honeycomb",
            LayoutType::Organic => "organic",
            LayoutType::Voronoi => "voronoi",
        }
    }

    /// Human readable name for menus.
    pub fn label(&self) -> &'static str {
        match self {
            LayoutType::SquareCheckerboard => "Square Checkerboard",
            LayoutType::HexCheckerboard => "Hex Checkerboard",
            LayoutType::HexHoneycomb => "Hex Honeycomb",
            LayoutType::Organic => "Organic",
            LayoutType::Voronoi => "Voronoi",
        }
    }

    /// Whether jitter, hole probability and seed apply to this layout.
    pub fn is_organic(&self) -> bool {
        matches!(self, LayoutType::Organic)
    }

    /// Whether relaxation iterations, hole probability and seed apply.
    pub fn is_voronoi(&self) -> bool {
        matches!(self, LayoutType::Voronoi)
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LayoutType::ALL
            .into_iter()
            .find(|layout| layout.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layout type '{}'", s))
    }
}

/// One of the two in-plane output dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal (x)
    Width,
    /// Vertical (y)
    Height,
}

impl Axis {
    /// Both axes, width first.
    pub const BOTH: [Axis; 2] = [Axis::Width, Axis::Height];

    /// Padding key that controls this axis.
    pub fn padding_key(&self) -> ParamKey {
        match self {
            Axis::Width => ParamKey::FloorPaddingX,
            Axis::Height => ParamKey::FloorPaddingY,
        }
    }

    /// Lowercase name used in status and log messages.
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Width => "width",
            Axis::Height => "height",
        }
    }
}

/// Lock state for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DimensionLock {
    /// Whether the axis is locked
    pub active: bool,
    /// Target raw extent, present only while locked
    pub target: Option<f64>,
}

/// Addressable fields of [`Parameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Layout selection
    LayoutType,
    /// Grid rows
    Rows,
    /// Grid columns
    Cols,
    /// Centre-to-centre spacing
    Spacing,
    /// Pillar radius
    PillarRadius,
    /// Pillar height above the floor
    PillarHeight,
    /// Hole radius
    HoleRadius,
    /// Floor thickness
    FloorThickness,
    /// Horizontal floor padding
    FloorPaddingX,
    /// Vertical floor padding
    FloorPaddingY,
    /// Wall thickness
    WallThickness,
    /// Positional jitter (organic)
    Jitter,
    /// Probability a cell becomes a hole
    HoleProbability,
    /// Lloyd relaxation iterations (voronoi)
    LloydIterations,
    /// Random seed
    Seed,
}

impl ParamKey {
    /// Every numeric key, in document order.
    pub const NUMERIC: [ParamKey; 14] = [
        ParamKey::Rows,
        ParamKey::Cols,
        ParamKey::Spacing,
        ParamKey::PillarRadius,
        ParamKey::PillarHeight,
        ParamKey::HoleRadius,
        ParamKey::FloorThickness,
        ParamKey::FloorPaddingX,
        ParamKey::FloorPaddingY,
        ParamKey::WallThickness,
        ParamKey::Jitter,
        ParamKey::HoleProbability,
        ParamKey::LloydIterations,
        ParamKey::Seed,
    ];

    /// Whether the field only holds whole numbers.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ParamKey::Rows | ParamKey::Cols | ParamKey::LloydIterations | ParamKey::Seed
        )
    }
}

/// A value assigned to a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Numeric value
    Number(f64),
    /// Unparsed form input
    Text(String),
    /// Layout selection
    Layout(LayoutType),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<LayoutType> for ParamValue {
    fn from(value: LayoutType) -> Self {
        ParamValue::Layout(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// The full parameter set edited by the user.
///
/// Numeric fields are stored as `f64` so that malformed input can be held as
/// NaN until the request layer rejects it. Integer fields are truncated on
/// assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Layout selection
    pub layout_type: LayoutType,
    /// Grid rows
    pub rows: f64,
    /// Grid columns
    pub cols: f64,
    /// Centre-to-centre spacing (mm)
    pub spacing: f64,
    /// Pillar radius (mm)
    pub pillar_radius: f64,
    /// Pillar height above the floor (mm)
    pub pillar_height: f64,
    /// Hole radius (mm)
    pub hole_radius: f64,
    /// Floor thickness (mm)
    pub floor_thickness: f64,
    /// Horizontal floor padding (mm)
    pub floor_padding_x: f64,
    /// Vertical floor padding (mm)
    pub floor_padding_y: f64,
    /// Wall thickness (mm)
    pub wall_thickness: f64,
    /// Positional jitter (mm)
    pub jitter: f64,
    /// Probability a cell becomes a hole (0..1)
    pub hole_probability: f64,
    /// Lloyd relaxation iterations
    pub lloyd_iterations: f64,
    /// Random seed
    pub seed: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            layout_type: LayoutType::HexCheckerboard,
            rows: 10.0,
            cols: 10.0,
            spacing: 0.35,
            pillar_radius: 0.125,
            pillar_height: 10.0,
            hole_radius: 0.10,
            floor_thickness: 2.0,
            floor_padding_x: 0.25,
            floor_padding_y: 0.25,
            wall_thickness: 2.0,
            jitter: 0.05,
            hole_probability: 0.20,
            lloyd_iterations: 0.0,
            seed: 42.0,
        }
    }
}

impl Parameters {
    /// Reads a numeric field. `ParamKey::LayoutType` has no numeric value
    /// and yields NaN.
    pub fn number(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::LayoutType => f64::NAN,
            ParamKey::Rows => self.rows,
            ParamKey::Cols => self.cols,
            ParamKey::Spacing => self.spacing,
            ParamKey::PillarRadius => self.pillar_radius,
            ParamKey::PillarHeight => self.pillar_height,
            ParamKey::HoleRadius => self.hole_radius,
            ParamKey::FloorThickness => self.floor_thickness,
            ParamKey::FloorPaddingX => self.floor_padding_x,
            ParamKey::FloorPaddingY => self.floor_padding_y,
            ParamKey::WallThickness => self.wall_thickness,
            ParamKey::Jitter => self.jitter,
            ParamKey::HoleProbability => self.hole_probability,
            ParamKey::LloydIterations => self.lloyd_iterations,
            ParamKey::Seed => self.seed,
        }
    }

    fn number_mut(&mut self, key: ParamKey) -> Option<&mut f64> {
        Some(match key {
            ParamKey::LayoutType => return None,
            ParamKey::Rows => &mut self.rows,
            ParamKey::Cols => &mut self.cols,
            ParamKey::Spacing => &mut self.spacing,
            ParamKey::PillarRadius => &mut self.pillar_radius,
            ParamKey::PillarHeight => &mut self.pillar_height,
            ParamKey::HoleRadius => &mut self.hole_radius,
            ParamKey::FloorThickness => &mut self.floor_thickness,
            ParamKey::FloorPaddingX => &mut self.floor_padding_x,
            ParamKey::FloorPaddingY => &mut self.floor_padding_y,
            ParamKey::WallThickness => &mut self.wall_thickness,
            ParamKey::Jitter => &mut self.jitter,
            ParamKey::HoleProbability => &mut self.hole_probability,
            ParamKey::LloydIterations => &mut self.lloyd_iterations,
            ParamKey::Seed => &mut self.seed,
        })
    }

    /// Assigns a value without validation.
    ///
    /// Text is parsed the way a form field would be: leading digits for
    /// integer fields, a leading decimal for the rest, NaN otherwise. A text
    /// value for the layout that names no known layout leaves it unchanged.
    pub fn assign(&mut self, key: ParamKey, value: ParamValue) {
        if key == ParamKey::LayoutType {
            match value {
                ParamValue::Layout(layout) => self.layout_type = layout,
                ParamValue::Text(text) => match text.parse() {
                    Ok(layout) => self.layout_type = layout,
                    Err(e) => log::warn!("Ignoring layout assignment: {}", e),
                },
                ParamValue::Number(n) => {
                    log::warn!("Ignoring numeric layout assignment: {}", n)
                }
            }
            return;
        }

        let number = match value {
            ParamValue::Number(n) => n,
            ParamValue::Text(text) if key.is_integer() => parse_leading_int(&text),
            ParamValue::Text(text) => parse_leading_float(&text),
            ParamValue::Layout(layout) => {
                log::warn!("Ignoring layout {} assigned to {:?}", layout, key);
                return;
            }
        };
        if let Some(slot) = self.number_mut(key) {
            *slot = if key.is_integer() { number.trunc() } else { number };
        }
    }

    /// Request-shaped projection with integer fields coerced.
    pub fn to_api(&self) -> ApiParameters {
        ApiParameters {
            layout_type: self.layout_type,
            rows: as_whole(self.rows),
            cols: as_whole(self.cols),
            spacing: self.spacing,
            pillar_radius: self.pillar_radius,
            pillar_height: self.pillar_height,
            hole_radius: self.hole_radius,
            floor_thickness: self.floor_thickness,
            floor_padding_x: self.floor_padding_x,
            floor_padding_y: self.floor_padding_y,
            wall_thickness: self.wall_thickness,
            hole_probability: self.hole_probability,
            jitter: self.jitter,
            lloyd_iterations: as_whole(self.lloyd_iterations),
            seed: as_whole(self.seed),
        }
    }
}

fn as_whole(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

/// Parameters in the shape the preview and generate endpoints expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiParameters {
    /// Layout selection
    pub layout_type: LayoutType,
    /// Grid rows
    pub rows: Option<i64>,
    /// Grid columns
    pub cols: Option<i64>,
    /// Centre-to-centre spacing
    pub spacing: f64,
    /// Pillar radius
    pub pillar_radius: f64,
    /// Pillar height
    pub pillar_height: f64,
    /// Hole radius
    pub hole_radius: f64,
    /// Floor thickness
    pub floor_thickness: f64,
    /// Horizontal floor padding
    pub floor_padding_x: f64,
    /// Vertical floor padding
    pub floor_padding_y: f64,
    /// Wall thickness
    pub wall_thickness: f64,
    /// Hole probability
    pub hole_probability: f64,
    /// Positional jitter
    pub jitter: f64,
    /// Lloyd relaxation iterations
    pub lloyd_iterations: Option<i64>,
    /// Random seed
    pub seed: Option<i64>,
}

impl ApiParameters {
    /// Rejects any field that is missing or not finite.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let ints = [
            ("rows", self.rows),
            ("cols", self.cols),
            ("lloyd_iterations", self.lloyd_iterations),
            ("seed", self.seed),
        ];
        if let Some((name, _)) = ints.iter().find(|(_, v)| v.is_none()) {
            return Err(ServiceError::MalformedParameter(name.to_string()));
        }

        let floats = [
            ("spacing", self.spacing),
            ("pillar_radius", self.pillar_radius),
            ("pillar_height", self.pillar_height),
            ("hole_radius", self.hole_radius),
            ("floor_thickness", self.floor_thickness),
            ("floor_padding_x", self.floor_padding_x),
            ("floor_padding_y", self.floor_padding_y),
            ("wall_thickness", self.wall_thickness),
            ("hole_probability", self.hole_probability),
            ("jitter", self.jitter),
        ];
        match floats.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, _)) => Err(ServiceError::MalformedParameter(name.to_string())),
            None => Ok(()),
        }
    }
}

/// Derived figures shown in the statistics panel and parameter document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Number of pillars
    pub pillar_count: usize,
    /// Number of holes
    pub hole_count: usize,
    /// Inner floor width
    pub inner_width: f64,
    /// Inner floor height
    pub inner_height: f64,
    /// Width including walls
    pub total_width: f64,
    /// Height including walls
    pub total_height: f64,
    /// Floor plus pillar height
    pub total_height_z: f64,
    /// Pillars per square millimetre of inner floor
    pub density: f64,
}

/// Parses the leading integer of `text` (`"12mm"` is 12), NaN when there is none.
pub fn parse_leading_int(text: &str) -> f64 {
    let text = text.trim_start();
    let end = numeric_prefix_len(text, false);
    text[..end].parse::<i64>().map(|v| v as f64).unwrap_or(f64::NAN)
}

/// Parses the leading decimal number of `text`, NaN when there is none.
pub fn parse_leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let mut end = numeric_prefix_len(text, true);
    while end > 0 {
        if let Ok(v) = text[..end].parse::<f64>() {
            return v;
        }
        end -= 1;
    }
    f64::NAN
}

fn numeric_prefix_len(text: &str, decimal: bool) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let mut seen_dot = false;
    let mut seen_exp = false;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {}
            b'.' if decimal && !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if decimal && !seen_exp => {
                seen_exp = true;
                if matches!(bytes.get(i + 1), Some(b'+') | Some(b'-')) {
                    i += 1;
                }
            }
            _ => break,
        }
        i += 1;
    }
    i
}
