use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Color assigned to one category: a single color or a ramp whose first
/// entry is used wherever one color is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryColor {
    Single(String),
    Ramp(Vec<String>),
}

impl CategoryColor {
    /// The single color, or the first ramp entry. `None` for an empty ramp.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::Single(color) => Some(color),
            Self::Ramp(colors) => colors.first().map(String::as_str),
        }
    }
}

impl From<&str> for CategoryColor {
    fn from(color: &str) -> Self {
        Self::Single(color.to_owned())
    }
}

impl From<String> for CategoryColor {
    fn from(color: String) -> Self {
        Self::Single(color)
    }
}

/// Display configuration for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CategoryColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default)]
    pub inactive: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub pointer: bool,
}

impl CategoryStyle {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<CategoryColor>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_ramp(mut self, colors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.color = Some(CategoryColor::Ramp(
            colors.into_iter().map(Into::into).collect(),
        ));
        self
    }

    #[must_use]
    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }
}

/// Ordered map from series key to category style.
///
/// Key iteration order is the order categories were inserted, and every
/// derived sequence (colors, legend items, series accessors, drawable
/// assignment) follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap {
    entries: IndexMap<String, CategoryStyle>,
}

impl CategoryMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a category, keeping the key's existing position when present.
    pub fn insert(&mut self, key: impl Into<String>, style: CategoryStyle) -> Option<CategoryStyle> {
        self.entries.insert(key.into(), style)
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, style: CategoryStyle) -> Self {
        self.insert(key, style);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CategoryStyle> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&str, &CategoryStyle)> {
        self.entries
            .get_index(index)
            .map(|(key, style)| (key.as_str(), style))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryStyle)> {
        self.entries.iter().map(|(key, style)| (key.as_str(), style))
    }

    /// Keys cloned into a vector, in map order.
    #[must_use]
    pub fn key_vec(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl FromIterator<(String, CategoryStyle)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (String, CategoryStyle)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
