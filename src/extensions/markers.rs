//! SVG point markers for line series.
//!
//! A [`MarkerSheet`] names one marker style per series key. The host injects
//! [`marker_defs`] into its SVG and applies [`marker_css_vars`] to the chart
//! wrapper; the engine's line styling picks markers up through the
//! `--vis-marker-{key}` custom properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Diamond,
}

/// Visual style of one series marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    #[serde(default)]
    pub shape: MarkerShape,
    #[serde(default = "default_marker_size")]
    pub size: f64,
    #[serde(default = "default_marker_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stroke_color: Option<String>,
}

impl MarkerStyle {
    #[must_use]
    pub fn new(shape: MarkerShape) -> Self {
        Self {
            shape,
            size: default_marker_size(),
            stroke_width: default_marker_stroke_width(),
            color: None,
            stroke_color: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, color: impl Into<String>, width: f64) -> Self {
        self.stroke_color = Some(color.into());
        self.stroke_width = width;
        self
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::new(MarkerShape::Circle)
    }
}

fn default_marker_size() -> f64 {
    8.0
}

fn default_marker_stroke_width() -> f64 {
    1.0
}

/// Marker styles keyed by series key, under one def-id namespace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerSheet {
    pub id: String,
    #[serde(default)]
    pub styles: IndexMap<String, MarkerStyle>,
}

impl MarkerSheet {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            styles: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, style: MarkerStyle) -> Self {
        self.styles.insert(key.into(), style);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// `<marker>` defs for every style in the sheet, ids `{sheet.id}-{key}`.
#[must_use]
pub fn marker_defs(sheet: &MarkerSheet) -> String {
    let mut defs = String::new();
    for (key, style) in &sheet.styles {
        let size = style.size;
        let half = size / 2.0;
        defs.push_str(&format!(
            "<marker id=\"{}-{key}\" viewBox=\"0 0 {size} {size}\" \
refX=\"{half}\" refY=\"{half}\" markerWidth=\"{size}\" markerHeight=\"{size}\" \
markerUnits=\"userSpaceOnUse\">{}</marker>",
            sheet.id,
            shape_element(style),
        ));
    }
    defs
}

/// CSS variables mapping each series key to its marker reference.
#[must_use]
pub fn marker_css_vars(sheet: &MarkerSheet) -> IndexMap<String, String> {
    sheet
        .styles
        .keys()
        .map(|key| {
            (
                format!("--vis-marker-{key}"),
                format!("url(\"#{}-{key}\")", sheet.id),
            )
        })
        .collect()
}

fn shape_element(style: &MarkerStyle) -> String {
    let size = style.size;
    let half = size / 2.0;
    let inset = style.stroke_width / 2.0;
    let fill = style.color.as_deref().unwrap_or("currentColor");
    let stroke = style.stroke_color.as_deref().unwrap_or("none");
    let paint = format!(
        "fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{}\"",
        style.stroke_width
    );
    let far = size - inset;
    match style.shape {
        MarkerShape::Circle => {
            let radius = half - inset;
            format!("<circle cx=\"{half}\" cy=\"{half}\" r=\"{radius}\" {paint} />")
        }
        MarkerShape::Square => {
            let side = size - style.stroke_width;
            format!("<rect x=\"{inset}\" y=\"{inset}\" width=\"{side}\" height=\"{side}\" {paint} />")
        }
        MarkerShape::Triangle => {
            format!("<polygon points=\"{half},{inset} {far},{far} {inset},{far}\" {paint} />")
        }
        MarkerShape::Diamond => format!(
            "<polygon points=\"{half},{inset} {far},{half} {half},{far} {inset},{half}\" {paint} />"
        ),
    }
}
