use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

/// One field value read out of a data row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(Cow<'a, str>),
}

impl FieldValue<'_> {
    /// Numeric view of the value. Text parses when it holds a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Field access for chart data rows.
///
/// Charts read rows through this trait instead of requiring a concrete
/// record type: series accessors resolve category keys, tooltips enumerate
/// row fields, and the bubble chart reads its category field as text.
pub trait Datum {
    /// Looks up a field by key. `None` when the row has no such field.
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;

    /// Keys present on this row, in the row's own order.
    fn field_keys(&self) -> Vec<String>;

    /// Numeric view of a field. Missing, non-numeric, and NaN values read
    /// as zero so a partial row never poisons a stacked sum.
    fn numeric_field(&self, key: &str) -> f64 {
        self.field(key)
            .and_then(|value| value.as_number())
            .filter(|value| !value.is_nan())
            .unwrap_or(0.0)
    }

    /// Text view of a field.
    fn text_field(&self, key: &str) -> Option<String> {
        self.field(key).map(|value| value.to_string())
    }

    /// The first field value on the row. Default tooltip titles use this.
    fn first_field(&self) -> Option<String> {
        let keys = self.field_keys();
        let key = keys.first()?;
        self.field(key).map(|value| value.to_string())
    }
}

impl<T: Datum + ?Sized> Datum for &T {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        (**self).field(key)
    }

    fn field_keys(&self) -> Vec<String> {
        (**self).field_keys()
    }
}

impl Datum for IndexMap<String, f64> {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.get(key).map(|value| FieldValue::Number(*value))
    }

    fn field_keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

impl Datum for BTreeMap<String, f64> {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.get(key).map(|value| FieldValue::Number(*value))
    }

    fn field_keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// JSON rows chart directly: numbers and strings are readable fields,
/// everything else is treated as absent.
impl Datum for serde_json::Value {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match self.get(key)? {
            serde_json::Value::Number(number) => number.as_f64().map(FieldValue::Number),
            serde_json::Value::String(text) => Some(FieldValue::Text(Cow::Borrowed(text))),
            _ => None,
        }
    }

    fn field_keys(&self) -> Vec<String> {
        match self {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
