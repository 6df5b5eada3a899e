//! Image export: write a display list as SVG and rasterize it to PNG.

use std::fmt::Write as _;
use std::sync::Arc;

use eframe::egui::Color32;

use super::rendering::EguiMeasure;
use super::state::PreviewApp;
use crate::error::ExportError;
use crate::render::{Frame, Primitive, TextAnchor};

impl PreviewApp {
    /// Renders the current preview, with the side profile when measurements
    /// are shown, to PNG bytes at `scale` pixels per point.
    pub fn export_png(&self, ctx: &eframe::egui::Context, scale: f32) -> Result<Vec<u8>, ExportError> {
        let frame = self
            .build_frame(&EguiMeasure::new(ctx))
            .ok_or(ExportError::NothingToExport)?;
        rasterize(&frame_to_svg(&frame), frame.size.x, frame.size.y, scale)
    }
}

/// Writes `frame` as a standalone SVG document on a white background.
pub fn frame_to_svg(frame: &Frame) -> String {
    let width = frame.size.x.max(1.0);
    let height = frame.size.y.max(1.0);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = width,
        h = height
    );
    let _ = writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\" />",
        width, height
    );

    for primitive in &frame.primitives {
        match primitive {
            Primitive::Rect { rect, fill, stroke } => {
                let _ = write!(
                    out,
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {}",
                    rect.min.x,
                    rect.min.y,
                    rect.width().max(0.0),
                    rect.height().max(0.0),
                    paint("fill", *fill)
                );
                match stroke {
                    Some(stroke) => {
                        let _ = writeln!(
                            out,
                            " {} stroke-width=\"{}\" />",
                            paint("stroke", stroke.color),
                            stroke.width
                        );
                    }
                    None => {
                        let _ = writeln!(out, " />");
                    }
                }
            }
            Primitive::Circle { center, radius, fill } => {
                let _ = writeln!(
                    out,
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" {} />",
                    center.x,
                    center.y,
                    radius,
                    paint("fill", *fill)
                );
            }
            Primitive::Line { points, stroke, dash } => {
                let _ = write!(
                    out,
                    "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {} stroke-width=\"{}\"",
                    points[0].x,
                    points[0].y,
                    points[1].x,
                    points[1].y,
                    paint("stroke", stroke.color),
                    stroke.width
                );
                if !dash.is_empty() {
                    let pattern: Vec<String> = dash.iter().map(|d| d.to_string()).collect();
                    let _ = write!(out, " stroke-dasharray=\"{}\"", pattern.join(","));
                }
                let _ = writeln!(out, " />");
            }
            Primitive::Text(label) => {
                let anchor = match label.anchor {
                    TextAnchor::Middle => "middle",
                    TextAnchor::Start => "start",
                };
                let _ = write!(
                    out,
                    "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"sans-serif\" font-size=\"{}\" font-weight=\"{}\" text-anchor=\"{}\" dominant-baseline=\"middle\" {}",
                    label.size,
                    if label.bold { "bold" } else { "normal" },
                    anchor,
                    paint("fill", label.color),
                    x = label.pos.x,
                    y = label.pos.y
                );
                if label.vertical {
                    let _ = write!(
                        out,
                        " transform=\"rotate(-90 {:.2} {:.2})\"",
                        label.pos.x, label.pos.y
                    );
                }
                let _ = writeln!(out, ">{}</text>", escape_xml(&label.text));
            }
        }
    }

    let _ = writeln!(out, "</svg>");
    out
}

/// Colour attribute pair, e.g. `fill="#3278c8" fill-opacity="0.702"`.
fn paint(attr: &str, color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 0 {
        return format!("{}=\"none\"", attr);
    }
    let mut s = format!("{}=\"#{:02x}{:02x}{:02x}\"", attr, r, g, b);
    if a < 255 {
        let _ = write!(s, " {}-opacity=\"{:.3}\"", attr, a as f32 / 255.0);
    }
    s
}

/// Parses `svg` and renders it onto a white pixmap, returning PNG bytes.
pub fn rasterize(svg: &str, width: f32, height: f32, scale: f32) -> Result<Vec<u8>, ExportError> {
    let mut opt = usvg::Options::default();
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    opt.fontdb = Arc::new(db);

    let tree = usvg::Tree::from_data(svg.as_bytes(), &opt).map_err(|e| ExportError::Svg(e.to_string()))?;

    let scale = scale.clamp(0.25, 8.0);
    let out_w = (width * scale).round().max(1.0) as u32;
    let out_h = (height * scale).round().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h).ok_or(ExportError::Pixmap {
        width: out_w,
        height: out_h,
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let mut pmut = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pmut);

    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}
