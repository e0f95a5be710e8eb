//! Axis tick and tooltip value formatting.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A tick value handed to axis formatters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Number(f64),
    Time(DateTime<Utc>),
}

impl Tick {
    /// Interprets an epoch-milliseconds value as a time tick.
    ///
    /// Values outside the representable range stay numeric.
    #[must_use]
    pub fn from_millis(millis: f64) -> Self {
        DateTime::from_timestamp_millis(millis as i64).map_or(Self::Number(millis), Self::Time)
    }

    #[must_use]
    pub const fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Time(_) => None,
        }
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Time(time) => write!(f, "{}", time.format("%Y-%m-%d")),
        }
    }
}

/// Formats one tick, given its index and the full tick run.
pub type TickFormatterFn = Arc<dyn Fn(Tick, usize, &[Tick]) -> String + Send + Sync + 'static>;

/// Formats a plain numeric value, e.g. in tooltips.
pub type ValueFormatterFn = Arc<dyn Fn(f64) -> String + Send + Sync + 'static>;

/// The fallback formatter: the tick's display form.
#[must_use]
pub fn default_tick_formatter() -> TickFormatterFn {
    Arc::new(|tick, _, _| tick.to_string())
}

/// Formats numeric ticks as calendar dates, reading them as epoch millis.
#[must_use]
pub fn date_tick_formatter() -> TickFormatterFn {
    Arc::new(|tick, _, _| match tick {
        Tick::Number(millis) => Tick::from_millis(millis).to_string(),
        Tick::Time(time) => time.format("%Y-%m-%d").to_string(),
    })
}

/// The fallback value formatter: plain [`f64`] display.
#[must_use]
pub fn default_value_formatter() -> ValueFormatterFn {
    Arc::new(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ticks_display_without_trailing_zero() {
        assert_eq!(Tick::Number(1234.0).to_string(), "1234");
        assert_eq!(Tick::Number(1.5).to_string(), "1.5");
    }

    #[test]
    fn date_formatter_reads_numbers_as_epoch_millis() {
        let format = date_tick_formatter();
        // 2024-03-01T00:00:00Z
        assert_eq!(format(Tick::Number(1_709_251_200_000.0), 0, &[]), "2024-03-01");
    }

    #[test]
    fn from_millis_keeps_out_of_range_values_numeric() {
        assert_eq!(Tick::from_millis(f64::MAX), Tick::Number(f64::MAX));
    }

    #[test]
    fn default_formatter_ignores_tick_context() {
        let format = default_tick_formatter();
        let ticks = [Tick::Number(1.0), Tick::Number(2.0)];
        assert_eq!(format(Tick::Number(2.0), 1, &ticks), "2");
    }
}
