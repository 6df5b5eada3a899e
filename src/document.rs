//! Plain-text parameter document and export file names.
//!
//! The document is meant to be read and edited by people. Import scans it
//! line by line for known labels and ignores everything else, so hand edits,
//! reordered sections and missing fields are all tolerated.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};

use crate::types::*;

/// Recognized labels, checked in this order against every line.
const FIELDS: [(&str, ParamKey); 15] = [
    ("Type:", ParamKey::LayoutType),
    ("Rows:", ParamKey::Rows),
    ("Columns:", ParamKey::Cols),
    ("Spacing:", ParamKey::Spacing),
    ("Pillar Radius:", ParamKey::PillarRadius),
    ("Pillar Height:", ParamKey::PillarHeight),
    ("Hole Radius:", ParamKey::HoleRadius),
    ("Floor Thickness:", ParamKey::FloorThickness),
    ("Floor Padding X:", ParamKey::FloorPaddingX),
    ("Floor Padding Y:", ParamKey::FloorPaddingY),
    ("Wall Thickness:", ParamKey::WallThickness),
    ("Jitter:", ParamKey::Jitter),
    ("Hole Probability:", ParamKey::HoleProbability),
    ("Relaxation Iterations:", ParamKey::LloydIterations),
    ("Random Seed:", ParamKey::Seed),
];

/// Renders the parameter document.
///
/// Derived dimensions and statistics print `N/A` until geometry has been received.
pub fn export_parameters(
    params: &Parameters,
    stats: Option<&Statistics>,
    generated: &DateTime<Local>,
) -> String {
    let dims = |w: Option<f64>, h: Option<f64>| match (w, h) {
        (Some(w), Some(h)) => format!("{:.3} × {:.3}", w, h),
        _ => "N/A × N/A".to_string(),
    };
    let inner = dims(stats.map(|s| s.inner_width), stats.map(|s| s.inner_height));
    let outer = dims(stats.map(|s| s.total_width), stats.map(|s| s.total_height));
    let density = stats
        .filter(|s| s.inner_width * s.inner_height > 0.0)
        .map_or_else(|| "N/A".to_string(), |s| format!("{:.4}", s.density));
    let (pillars, holes) = stats.map_or((0, 0), |s| (s.pillar_count, s.hole_count));

    let mut out = String::new();
    let _ = writeln!(out, "PILLAR GRID PARAMETERS");
    let _ = writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out);
    let _ = writeln!(out, "=== LAYOUT ===");
    let _ = writeln!(out, "Type: {}", params.layout_type);
    let _ = writeln!(out, "Rows: {}", whole(params.rows));
    let _ = writeln!(out, "Columns: {}", whole(params.cols));
    let _ = writeln!(
        out,
        "Spacing: {} mm (center-to-center distance between adjacent pillars)",
        params.spacing
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "=== PILLAR GEOMETRY ===");
    let _ = writeln!(out, "Pillar Radius: {} mm", params.pillar_radius);
    let _ = writeln!(out, "Pillar Height: {} mm", params.pillar_height);
    let _ = writeln!(
        out,
        "Total Height (Floor + Pillar): {:.3} mm",
        params.floor_thickness + params.pillar_height
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "=== HOLE GEOMETRY ===");
    let _ = writeln!(out, "Hole Radius: {} mm", params.hole_radius);
    let _ = writeln!(out);
    let _ = writeln!(out, "=== FLOOR ===");
    let _ = writeln!(out, "Floor Thickness: {} mm", params.floor_thickness);
    let _ = writeln!(
        out,
        "Floor Padding X: {} mm (horizontal distance from outermost pillars/holes to inner floor edge)",
        params.floor_padding_x
    );
    let _ = writeln!(
        out,
        "Floor Padding Y: {} mm (vertical distance from outermost pillars/holes to inner floor edge)",
        params.floor_padding_y
    );
    let _ = writeln!(out, "Inner Floor Dimensions: {} mm (excluding walls)", inner);
    let _ = writeln!(out);
    let _ = writeln!(out, "=== WALLS ===");
    let _ = writeln!(out, "Wall Thickness: {} mm", params.wall_thickness);
    let _ = writeln!(out, "Total Outer Dimensions: {} mm (including walls)", outer);
    let _ = writeln!(out);
    let _ = writeln!(out, "=== ORGANIC LAYOUT (if applicable) ===");
    let _ = writeln!(out, "Jitter: {} mm (random position deviation)", params.jitter);
    let _ = writeln!(out, "Hole Probability: {} (0.0 to 1.0)", params.hole_probability);
    let _ = writeln!(out, "Random Seed: {}", whole(params.seed));
    let _ = writeln!(out);
    let _ = writeln!(out, "=== VORONOI LAYOUT (if applicable) ===");
    let _ = writeln!(
        out,
        "Relaxation Iterations: {} (Lloyd smoothing passes)",
        whole(params.lloyd_iterations)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "=== STATISTICS ===");
    let _ = writeln!(out, "Total Pillars: {}", pillars);
    let _ = writeln!(out, "Total Holes: {}", holes);
    let _ = writeln!(out, "Pillar Density: {} pillars/mm²", density);
    let _ = writeln!(out);
    let _ = writeln!(out, "=== NOTES ===");
    let _ = writeln!(out, "- Spacing is measured center-to-center between adjacent pillars");
    let _ = writeln!(
        out,
        "- Floor padding is the gap between the outermost elements and the inner edge of the floor (before walls)"
    );
    let _ = writeln!(out, "- Inner floor dimensions exclude wall thickness");
    let _ = writeln!(out, "- Total outer dimensions include wall thickness on all sides");
    let _ = writeln!(
        out,
        "- For hex layouts, row spacing is automatically calculated as spacing × √3/2"
    );
    out
}

fn whole(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value.trunc() as i64)
    } else {
        "N/A".to_string()
    }
}

/// Extracts every recognized field from a parameter document.
///
/// Each line is matched against the first label it contains. The value runs
/// from the first `:` to an optional `(`. Values that do not parse are
/// skipped; they never abort the import.
pub fn import_parameters(text: &str) -> Vec<(ParamKey, ParamValue)> {
    let mut patch = Vec::new();
    for line in text.lines() {
        let Some(&(label, key)) = FIELDS.iter().find(|(label, _)| line.contains(label)) else {
            continue;
        };
        let Some(raw) = field_value(line) else {
            continue;
        };

        let value = match key {
            ParamKey::LayoutType => match raw.parse::<LayoutType>() {
                Ok(layout) => ParamValue::Layout(layout),
                Err(e) => {
                    log::warn!("Skipping '{}' {}", label, e);
                    continue;
                }
            },
            key if key.is_integer() => ParamValue::Number(parse_leading_int(raw)),
            _ => ParamValue::Number(parse_leading_float(raw)),
        };
        if matches!(value, ParamValue::Number(n) if n.is_nan()) {
            log::warn!("Skipping '{}' with unreadable value '{}'", label, raw);
            continue;
        }
        patch.push((key, value));
    }
    patch
}

fn field_value(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(':')?;
    let value = rest.split('(').next().unwrap_or(rest).trim();
    (!value.is_empty()).then_some(value)
}

/// UTC timestamp used in export file names, e.g. `2026-10-19T08-30-00`.
pub fn file_timestamp(now: &DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// Default name of an exported parameter document.
pub fn params_filename(now: &DateTime<Utc>) -> String {
    format!("pillar_grid_params_{}.txt", file_timestamp(now))
}

/// Default name of an exported preview image.
pub fn image_filename(now: &DateTime<Utc>) -> String {
    format!("pillar_grid_preview_{}.png", file_timestamp(now))
}

/// Default name of a generated STL file.
pub fn artifact_filename(layout: LayoutType, now: &DateTime<Utc>) -> String {
    format!("pillar_grid_{}_{}.stl", layout, file_timestamp(now))
}
