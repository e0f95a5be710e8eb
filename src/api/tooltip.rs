//! Tooltip markup assembly.
//!
//! Builds the HTML string a tooltip trigger template returns to the engine:
//! a title line plus one dot/label/value row per visible series entry. All
//! styling is inlined through `--vis-tooltip-*` custom properties so host
//! themes can restyle without touching markup.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::core::category::CategoryMap;
use crate::core::color::category_color;
use crate::core::datum::Datum;
use crate::core::format::ValueFormatterFn;

/// Formats the tooltip title from the hovered row.
pub type TitleFormatterFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync + 'static>;

/// Internal bookkeeping fields never shown in tooltips.
pub const TOOLTIP_BLOCKLIST_KEYS: [&str; 3] = ["_index", "_stacked", "_ending"];

/// One dot/label/value row.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipEntry {
    pub key: String,
    pub name: String,
    pub value: f64,
    pub color: String,
}

const CONTAINER_STYLE: &str = "display:flex;flex-direction:column;padding:0px;margin:0px";

const TITLE_STYLE: &str = "color:var(--vis-tooltip-title-color, #000);\
text-transform:var(--vis-tooltip-title-text-transform, capitalize);\
border-bottom:var(--vis-tooltip-title-border-bottom, 1px solid #e5e7eb);\
padding:var(--vis-tooltip-title-padding, 0.75rem 0.75rem 0.5rem 0.75rem);\
margin:var(--vis-tooltip-title-margin, 0 0 0.25rem 0);\
font-size:var(--vis-tooltip-title-font-size, 0.875rem);\
line-height:var(--vis-tooltip-title-line-height, 100%);\
font-weight:var(--vis-tooltip-title-font-weight, 600)";

const CONTENT_STYLE: &str = "display:grid;grid-template-columns:auto 1fr auto;\
align-items:center;gap:var(--vis-tooltip-content-gap, 0.25rem 0.5rem);\
padding:var(--vis-tooltip-content-padding, 0 0.75rem 0.5rem 0.75rem)";

const LABEL_STYLE: &str = "font-weight:var(--vis-tooltip-label-font-weight, 400);\
font-size:var(--vis-tooltip-label-font-size, 0.875rem);\
color:var(--vis-tooltip-label-color, inherit);\
margin:var(--vis-tooltip-label-margin, 0 1rem 0 0);white-space:nowrap";

const VALUE_STYLE: &str = "font-size:var(--vis-tooltip-value-font-size, 0.875rem);\
font-weight:var(--vis-tooltip-value-font-weight, 600);\
color:var(--vis-tooltip-value-color, inherit);text-align:right;\
font-variant-numeric:tabular-nums";

fn dot_style(color: &str) -> String {
    format!(
        "width:8px;height:8px;aspect-ratio:1;\
border-radius:var(--vis-tooltip-dot-border-radius, 4px);\
margin:var(--vis-tooltip-dot-margin, 0);flex-shrink:0;background-color:{color}"
    )
}

/// The rows to show for a hovered datum: its fields in datum order, kept
/// only when the key names a category and is not internal bookkeeping.
///
/// Dot colors resolve through the category style, with the positional
/// placeholder keyed by the entry's position in the visible list.
#[must_use]
pub fn visible_entries<T: Datum>(row: &T, categories: &CategoryMap) -> Vec<TooltipEntry> {
    row.field_keys()
        .into_iter()
        .filter(|key| {
            !TOOLTIP_BLOCKLIST_KEYS.contains(&key.as_str()) && categories.contains_key(key)
        })
        .enumerate()
        .map(|(index, key)| {
            let style = categories.get(&key);
            TooltipEntry {
                name: style.map_or_else(|| key.clone(), |style| style.name.clone()),
                value: row.numeric_field(&key),
                color: category_color(style, index),
                key,
            }
        })
        .collect()
}

/// The tooltip title: the custom formatter's output, else the row's first
/// field value.
#[must_use]
pub fn tooltip_title<T: Datum>(row: &T, formatter: Option<&TitleFormatterFn<T>>) -> Option<String> {
    if let Some(formatter) = formatter {
        return Some(formatter(row));
    }
    row.first_field().map(|value| value.to_string())
}

/// Assembles the full tooltip markup for a hovered row.
#[must_use]
pub fn tooltip_html<T: Datum>(
    row: &T,
    categories: &CategoryMap,
    title_formatter: Option<&TitleFormatterFn<T>>,
    value_formatter: Option<&ValueFormatterFn>,
) -> String {
    let mut html = format!("<div class=\"vis-tooltip\" style=\"{CONTAINER_STYLE}\">");
    if let Some(title) = tooltip_title(row, title_formatter) {
        let _ = write!(
            html,
            "<div class=\"vis-tooltip-title\" style=\"{TITLE_STYLE}\">{title}</div>"
        );
    }
    let _ = write!(html, "<div class=\"vis-tooltip-content\" style=\"{CONTENT_STYLE}\">");
    for entry in visible_entries(row, categories) {
        let value = value_formatter.map_or_else(|| entry.value.to_string(), |f| f(entry.value));
        let _ = write!(
            html,
            "<span class=\"vis-tooltip-dot\" style=\"{}\"></span>\
<span class=\"vis-tooltip-label\" style=\"{LABEL_STYLE}\">{}</span>\
<span class=\"vis-tooltip-value\" style=\"{VALUE_STYLE}\">{}</span>",
            dot_style(&entry.color),
            entry.name,
            value,
        );
    }
    html.push_str("</div></div>");
    html
}
