//! Gauge variants and the rating input.
//!
//! Each variant validates its config once, wires a `GaugeDriver` and turns
//! the animated value into a `Scene` on demand.

pub mod arc;
pub mod bar;
pub mod column;
pub mod rating;
pub mod speedometer;
pub mod torus;

pub use arc::ArcGauge;
pub use bar::BarGauge;
pub use column::ColumnGauge;
pub use rating::RatingWidget;
pub use speedometer::Speedometer;
pub use torus::{Band, TorusGauge};

use crate::Color;

/// Main value text.
pub const VALUE_TEXT: Color = Color::hex(0x333333);
/// Axis and threshold labels.
pub const AXIS_TEXT: Color = Color::hex(0x888888);
pub const MARKER: Color = Color::hex(0x333333);

/// Whole numbers without a decimal point, everything else to one place.
pub fn format_reading(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_format_like_the_dial_labels() {
        assert_eq!(format_reading(10.0), "10");
        assert_eq!(format_reading(7.25), "7.2");
        assert_eq!(format_reading(-3.0), "-3");
    }
}
