//! Presentation constants for the measurement overlay.
//!
//! The registry holds an active [`MeasurementStyle`] consulted by the
//! renderer on every frame and a fixed default used by [`StyleRegistry::reset`].
//! Styles round-trip through a camelCase JSON document in which the dash
//! pattern is written as a comma-joined string.

use eframe::egui::Color32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::StyleError;

/// Visual configuration of dimension lines, brackets and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementStyle {
    /// Label font size (px)
    pub font_size: f32,
    /// CSS font weight, `bold` or `normal`
    pub font_weight: String,
    /// Colour of dimension lines and radius indicators
    pub dimension_color: String,
    /// Colour of bracket annotations
    pub bracket_color: String,
    /// Stroke width of annotation lines (px)
    pub line_width: f32,
    /// Label plate colour
    #[serde(rename = "labelBg")]
    pub label_background: String,
    /// Label plate opacity; no plate is drawn at zero
    pub label_opacity: f32,
    /// Horizontal padding inside the label plate (px)
    pub label_padding: f32,
    /// Dash and gap lengths for extension lines (px)
    #[serde(
        serialize_with = "serialize_dash_pattern",
        deserialize_with = "deserialize_dash_pattern"
    )]
    pub dash_pattern: Vec<f32>,
    /// Arrowhead length (px)
    pub cap_size: f32,
    /// Bracket end tick length (px)
    pub bracket_size: f32,
    /// Radius of centre dots (px)
    pub dot_size: f32,
    /// Gap between a radius indicator and its label (px)
    pub label_offset: f32,
    /// Perpendicular offset of the spacing dimension line (px)
    pub measurement_offset: f32,
    /// Gap between a bracket and its label (px)
    pub bracket_label_offset: f32,
    /// Vertical shift of the spacing label (px)
    pub spacing_label_offset: f32,
    /// Vertical position of the pad-x bracket relative to the floor edge (px)
    pub pad_x_offset: f32,
    /// Horizontal position of the pad-y bracket relative to the floor edge (px)
    pub pad_y_offset: f32,
    /// Whether labels of vertical brackets are rotated to read bottom-up
    pub rotate_vertical_labels: bool,
}

impl Default for MeasurementStyle {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            font_weight: "bold".to_string(),
            dimension_color: "#e74c3c".to_string(),
            bracket_color: "#9b59b6".to_string(),
            line_width: 1.5,
            label_background: "#ffffff".to_string(),
            label_opacity: 0.95,
            label_padding: 4.0,
            dash_pattern: vec![3.0, 3.0],
            cap_size: 8.0,
            bracket_size: 10.0,
            dot_size: 2.0,
            label_offset: 20.0,
            measurement_offset: -40.0,
            bracket_label_offset: 12.0,
            spacing_label_offset: 0.0,
            pad_x_offset: -35.0,
            pad_y_offset: -20.0,
            rotate_vertical_labels: true,
        }
    }
}

impl MeasurementStyle {
    /// Larger, plate-less labels tuned for screenshots. Active at startup.
    pub fn presentation() -> Self {
        Self {
            font_size: 14.0,
            line_width: 2.0,
            label_opacity: 0.0,
            label_padding: 2.0,
            cap_size: 12.0,
            bracket_size: 12.0,
            dot_size: 4.0,
            measurement_offset: -60.0,
            bracket_label_offset: 30.0,
            spacing_label_offset: -20.0,
            pad_x_offset: -16.0,
            pad_y_offset: -16.0,
            ..Self::default()
        }
    }

    /// Whether labels use a bold face.
    pub fn is_bold(&self) -> bool {
        matches!(self.font_weight.trim(), "bold" | "bolder" | "600" | "700" | "800" | "900")
    }

    /// Dimension line colour.
    pub fn dimension_color32(&self) -> Color32 {
        parse_css_color(&self.dimension_color).unwrap_or(Color32::RED)
    }

    /// Bracket colour.
    pub fn bracket_color32(&self) -> Color32 {
        parse_css_color(&self.bracket_color).unwrap_or(Color32::LIGHT_BLUE)
    }

    /// Label plate colour with the configured opacity applied.
    pub fn label_plate_color32(&self) -> Color32 {
        let base = parse_css_color(&self.label_background).unwrap_or(Color32::WHITE);
        let [r, g, b, a] = base.to_srgba_unmultiplied();
        let alpha = (a as f32 * self.label_opacity.clamp(0.0, 1.0)).round() as u8;
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }

    fn validate(&self) -> Result<(), StyleError> {
        let colors = [
            ("dimensionColor", &self.dimension_color),
            ("bracketColor", &self.bracket_color),
            ("labelBg", &self.label_background),
        ];
        for (field, value) in colors {
            if parse_css_color(value).is_none() {
                return Err(StyleError::Field {
                    field: field.to_string(),
                    reason: format!("'{}' is not a colour", value),
                });
            }
        }
        if self.dash_pattern.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(StyleError::Field {
                field: "dashPattern".to_string(),
                reason: "lengths must be non-negative numbers".to_string(),
            });
        }
        Ok(())
    }
}

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)` and `rgba(r,g,b,a)`.
pub fn parse_css_color(text: &str) -> Option<Color32> {
    let text = text.trim();
    if text.starts_with('#') {
        return Color32::from_hex(text).ok();
    }

    let lower = text.to_ascii_lowercase();
    let inner = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    match parts.as_slice() {
        [r, g, b] => Some(Color32::from_rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha = a.parse::<f32>().ok()?.clamp(0.0, 1.0);
            Some(Color32::from_rgba_unmultiplied(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}

fn serialize_dash_pattern<S: Serializer>(pattern: &[f32], serializer: S) -> Result<S::Ok, S::Error> {
    let joined = pattern
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    serializer.serialize_str(&joined)
}

fn deserialize_dash_pattern<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DashPattern {
        Joined(String),
        List(Vec<f32>),
    }

    match DashPattern::deserialize(deserializer)? {
        DashPattern::List(values) => Ok(values),
        DashPattern::Joined(text) => text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f32>()
                    .map_err(|e| serde::de::Error::custom(format!("'{}': {}", part, e)))
            })
            .collect(),
    }
}

/// Active and default measurement styles.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    active: MeasurementStyle,
    defaults: MeasurementStyle,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self {
            active: MeasurementStyle::presentation(),
            defaults: MeasurementStyle::default(),
        }
    }
}

impl StyleRegistry {
    /// Creates a registry with the presentation style active.
    pub fn new() -> Self {
        Self::default()
    }

    /// The style the renderer uses.
    pub fn get(&self) -> &MeasurementStyle {
        &self.active
    }

    /// Mutable access for direct edits from the UI.
    pub fn get_mut(&mut self) -> &mut MeasurementStyle {
        &mut self.active
    }

    /// Sets a single camelCase field.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), StyleError> {
        let mut patch = Map::new();
        patch.insert(key.to_string(), value);
        self.update(&patch)
    }

    /// Merges the given camelCase fields into the active style.
    ///
    /// Either every field is applied or, on error, none is. Unknown keys
    /// are ignored.
    pub fn update(&mut self, patch: &Map<String, Value>) -> Result<(), StyleError> {
        let mut merged = match serde_json::to_value(&self.active) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(StyleError::NotAnObject),
            Err(e) => return Err(StyleError::Parse(e.to_string())),
        };

        for (key, value) in patch {
            if !merged.contains_key(key) {
                log::debug!("Ignoring unknown style key '{}'", key);
                continue;
            }
            merged.insert(key.clone(), value.clone());
            serde_json::from_value::<MeasurementStyle>(Value::Object(merged.clone())).map_err(
                |e| StyleError::Field {
                    field: key.clone(),
                    reason: e.to_string(),
                },
            )?;
        }

        let candidate: MeasurementStyle = serde_json::from_value(Value::Object(merged))
            .map_err(|e| StyleError::Parse(e.to_string()))?;
        candidate.validate()?;
        self.active = candidate;
        Ok(())
    }

    /// Loads a style document, merging it into the active style.
    pub fn load(&mut self, document: Value) -> Result<(), StyleError> {
        match document {
            Value::Object(map) => self.update(&map),
            _ => Err(StyleError::NotAnObject),
        }
    }

    /// Parses and loads a JSON style document.
    pub fn load_str(&mut self, json: &str) -> Result<(), StyleError> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| StyleError::Parse(e.to_string()))?;
        self.load(document)
    }

    /// Restores the default style.
    pub fn reset(&mut self) {
        self.active = self.defaults.clone();
    }

    /// The active style as pretty-printed JSON.
    pub fn export_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presentation_style_active_at_startup() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.get().font_size, 14.0);
        assert_eq!(registry.get().label_opacity, 0.0);
        assert_eq!(registry.defaults.font_size, 11.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut registry = StyleRegistry::new();
        registry.reset();
        assert_eq!(registry.get(), &MeasurementStyle::default());
    }

    #[test]
    fn test_load_merges_and_splits_dash_pattern() {
        let mut registry = StyleRegistry::new();
        registry
            .load(json!({"fontSize": 18, "dashPattern": "5, 2", "bracketColor": "#123456"}))
            .unwrap();
        let style = registry.get();
        assert_eq!(style.font_size, 18.0);
        assert_eq!(style.dash_pattern, vec![5.0, 2.0]);
        assert_eq!(style.bracket_color, "#123456");
        assert_eq!(style.cap_size, 12.0);
    }

    #[test]
    fn test_load_accepts_dash_array() {
        let mut registry = StyleRegistry::new();
        registry.load(json!({"dashPattern": [4, 1.5]})).unwrap();
        assert_eq!(registry.get().dash_pattern, vec![4.0, 1.5]);
    }

    #[test]
    fn test_export_joins_dash_pattern() {
        let registry = StyleRegistry::new();
        let doc: Value = serde_json::from_str(&registry.export_string().unwrap()).unwrap();
        assert_eq!(doc["dashPattern"], "3,3");
        assert_eq!(doc["labelBg"], "#ffffff");
        assert_eq!(doc["rotateVerticalLabels"], true);
    }

    #[test]
    fn test_export_then_load_preserves_style() {
        let mut source = StyleRegistry::new();
        source.set("capSize", json!(9.5)).unwrap();
        let text = source.export_string().unwrap();

        let mut target = StyleRegistry::new();
        target.reset();
        target.load_str(&text).unwrap();
        assert_eq!(target.get(), source.get());
    }

    #[test]
    fn test_invalid_field_leaves_style_untouched() {
        let mut registry = StyleRegistry::new();
        let before = registry.get().clone();
        let err = registry
            .load(json!({"fontSize": 20, "lineWidth": "thick"}))
            .unwrap_err();
        assert!(matches!(err, StyleError::Field { ref field, .. } if field == "lineWidth"));
        assert_eq!(registry.get(), &before);

        assert!(matches!(
            registry.load(json!({"dimensionColor": "not-a-colour"})),
            Err(StyleError::Field { .. })
        ));
        assert!(matches!(registry.load(json!([1, 2])), Err(StyleError::NotAnObject)));
    }

    #[test]
    fn test_parse_css_color() {
        assert_eq!(parse_css_color("#fff"), Some(Color32::WHITE));
        assert_eq!(
            parse_css_color("#e74c3c"),
            Some(Color32::from_rgb(0xe7, 0x4c, 0x3c))
        );
        assert_eq!(
            parse_css_color("rgba(255, 100, 100, 0.5)"),
            Some(Color32::from_rgba_unmultiplied(255, 100, 100, 128))
        );
        assert_eq!(parse_css_color("rgb(1,2,3)"), Some(Color32::from_rgb(1, 2, 3)));
        assert_eq!(parse_css_color("blue-ish"), None);
    }
}
