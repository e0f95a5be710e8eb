//! Series accessor factories.
//!
//! Charts never read rows directly: every drawable config carries accessor
//! closures built here from category keys. Stacked line overlays use the
//! cumulative set so each line sits on top of the series below it.

use std::sync::Arc;

use crate::core::datum::Datum;

/// Accessor returning one numeric series value for a row.
pub type NumericAccessor<T> = Arc<dyn Fn(&T) -> f64 + Send + Sync + 'static>;

/// Accessor over a row and its index; x values plot by index.
pub type IndexedAccessor<T> = Arc<dyn Fn(&T, usize) -> f64 + Send + Sync + 'static>;

/// Accessor returning a text value, e.g. a timeline row's category.
pub type TextAccessor<T> = Arc<dyn Fn(&T) -> String + Send + Sync + 'static>;

/// Accessor resolving a per-row color.
pub type ColorAccessor<T> = Arc<dyn Fn(&T) -> String + Send + Sync + 'static>;

/// The default x accessor: rows plot at their index.
#[must_use]
pub fn index_x<T>() -> IndexedAccessor<T> {
    Arc::new(|_, index| index as f64)
}

/// Accessor for a single series key.
#[must_use]
pub fn series_accessor<T: Datum>(key: impl Into<String>) -> NumericAccessor<T> {
    let key = key.into();
    Arc::new(move |datum: &T| datum.numeric_field(&key))
}

/// One accessor per key, in key order.
#[must_use]
pub fn series_accessors<T: Datum>(keys: &[String]) -> Vec<NumericAccessor<T>> {
    keys.iter().map(|key| series_accessor(key.clone())).collect()
}

/// Cumulative accessors: accessor `i` sums the values of keys `0..=i`.
///
/// Over `{a: 1, b: 2, c: 3}` with keys `[a, b, c]` the accessors yield
/// `1`, `3`, `6`.
#[must_use]
pub fn cumulative_accessors<T: Datum>(keys: &[String]) -> Vec<NumericAccessor<T>> {
    (0..keys.len())
        .map(|index| {
            let prefix: Arc<[String]> = keys[..=index].to_vec().into();
            let accessor: NumericAccessor<T> = Arc::new(move |datum: &T| {
                prefix.iter().map(|key| datum.numeric_field(key)).sum()
            });
            accessor
        })
        .collect()
}

/// Accessor returning a constant, used as the bubble size fallback.
#[must_use]
pub fn constant_accessor<T>(value: f64) -> NumericAccessor<T> {
    Arc::new(move |_| value)
}
