pub mod accessor;
pub mod category;
pub mod color;
pub mod datum;
pub mod format;
pub mod legend;

pub use accessor::{ColorAccessor, IndexedAccessor, NumericAccessor, TextAccessor};
pub use category::{CategoryColor, CategoryMap, CategoryStyle};
pub use datum::{Datum, FieldValue};
pub use format::{Tick, TickFormatterFn, ValueFormatterFn};
pub use legend::{LegendAlignment, LegendItem, LegendPosition};
