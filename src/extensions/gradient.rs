//! SVG gradient defs for area fills.
//!
//! Area series are filled with `url(#gradient-…)` references into a defs
//! block the host injects into its SVG. Ids are derived from the series
//! index and color so a palette change regenerates matching references.

use serde::{Deserialize, Serialize};

/// One gradient stop; the offset keeps its CSS form (`"0%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: String,
    pub stop_opacity: f64,
}

impl GradientStop {
    #[must_use]
    pub fn new(offset: impl Into<String>, stop_opacity: f64) -> Self {
        Self {
            offset: offset.into(),
            stop_opacity,
        }
    }
}

/// The stock fade: fully opaque at the top, transparent at the bottom.
#[must_use]
pub fn default_gradient_stops() -> Vec<GradientStop> {
    vec![GradientStop::new("0%", 1.0), GradientStop::new("100%", 0.0)]
}

/// Def id for the series at `index`, hash characters stripped so hex colors
/// stay id-safe.
#[must_use]
pub fn gradient_id(index: usize, color: &str) -> String {
    format!("gradient-{index}-{}", color.replace('#', ""))
}

/// Fill reference for the series at `index`.
#[must_use]
pub fn gradient_fill(index: usize, color: &str) -> String {
    format!("url(#{})", gradient_id(index, color))
}

/// One vertical `<linearGradient>` per series color.
///
/// A closing transparent stop is always appended after the configured run,
/// so a fill never extends past the configured fade.
#[must_use]
pub fn gradient_defs(colors: &[String], stops: &[GradientStop]) -> String {
    let mut defs = String::new();
    for (index, color) in colors.iter().enumerate() {
        defs.push_str(&format!(
            "<linearGradient id=\"{}\" gradientTransform=\"rotate(90)\">",
            gradient_id(index, color)
        ));
        for stop in stops {
            defs.push_str(&format!(
                "<stop offset=\"{}\" stop-color=\"{color}\" stop-opacity=\"{}\" />",
                stop.offset, stop.stop_opacity
            ));
        }
        defs.push_str(&format!(
            "<stop offset=\"100%\" stop-color=\"{color}\" stop-opacity=\"0\" /></linearGradient>"
        ));
    }
    defs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_ids_strip_hash_characters() {
        assert_eq!(gradient_id(0, "#3b82f6"), "gradient-0-3b82f6");
        assert_eq!(gradient_id(2, "var(--vis-color2)"), "gradient-2-var(--vis-color2)");
    }

    #[test]
    fn fills_reference_the_matching_def() {
        assert_eq!(gradient_fill(1, "#ef4444"), "url(#gradient-1-ef4444)");
    }

    #[test]
    fn defs_append_a_closing_transparent_stop() {
        let colors = vec!["#3b82f6".to_owned()];
        let defs = gradient_defs(&colors, &default_gradient_stops());
        assert_eq!(defs.matches("<stop ").count(), 3);
        assert!(defs.contains("id=\"gradient-0-3b82f6\""));
        assert!(defs.contains("gradientTransform=\"rotate(90)\""));
        assert!(defs.ends_with("</linearGradient>"));
    }

    #[test]
    fn defs_cover_every_series_color() {
        let colors = vec!["#111111".to_owned(), "#222222".to_owned()];
        let defs = gradient_defs(&colors, &default_gradient_stops());
        assert!(defs.contains("gradient-0-111111"));
        assert!(defs.contains("gradient-1-222222"));
    }
}
