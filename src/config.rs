//! Per-variant gauge configuration.
//!
//! Every optional field has a default carried by its builder; `validate` is
//! called once when a gauge is constructed.

use crate::animation::SpringParams;
use crate::error::GaugeError;
use crate::Color;
use bon::Builder;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Demo re-randomization interval bounds, per variant.
pub const ARC_DEMO_INTERVAL: (Duration, Duration) = (Duration::from_secs(1), Duration::from_secs(31));
pub const BAR_DEMO_INTERVAL: (Duration, Duration) = (Duration::from_secs(1), Duration::from_secs(10));
pub const COLUMN_DEMO_INTERVAL: (Duration, Duration) = (Duration::from_secs(1), Duration::from_secs(10));
pub const TORUS_DEMO_INTERVAL: (Duration, Duration) = (Duration::from_secs(1), Duration::from_secs(11));
pub const SPEEDOMETER_DEMO_INTERVAL: (Duration, Duration) =
    (Duration::from_secs(1), Duration::from_secs(31));

/// Longest accepted demo interval bound.
pub const MAX_DEMO_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Centre text of arc and torus gauges.
#[derive(Clone)]
pub enum Label {
    Text(String),
    /// Applied to the rounded animated value on every render.
    Format(Rc<dyn Fn(f64) -> String>),
}

impl Label {
    pub fn text(text: impl Into<String>) -> Self {
        Label::Text(text.into())
    }

    pub fn format<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + 'static,
    {
        Label::Format(Rc::new(f))
    }

    pub fn render(&self, value: f64) -> String {
        match self {
            Label::Text(text) => text.clone(),
            Label::Format(f) => f(value),
        }
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Label::Format(_) => f.write_str("Format(..)"),
        }
    }
}

/// Band boundaries of a tri-colour gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 30.0,
            high: 70.0,
        }
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), GaugeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GaugeError::InvalidConfig(format!("{name} must be finite, got {value}")))
    }
}

fn check_duration(duration: f64) -> Result<(), GaugeError> {
    check_finite("duration", duration)?;
    if duration < 0.0 {
        return Err(GaugeError::InvalidConfig(format!(
            "duration must not be negative, got {duration}"
        )));
    }
    if Duration::try_from_secs_f64(duration).is_err() {
        return Err(GaugeError::InvalidConfig(format!(
            "duration {duration}s is too long"
        )));
    }
    Ok(())
}

fn check_interval(interval: (Duration, Duration)) -> Result<(), GaugeError> {
    if interval.1 < interval.0 {
        return Err(GaugeError::InvalidConfig(format!(
            "demo interval upper bound {:?} is below lower bound {:?}",
            interval.1, interval.0
        )));
    }
    if interval.1 > MAX_DEMO_INTERVAL {
        return Err(GaugeError::InvalidConfig(format!(
            "demo interval upper bound {:?} exceeds {:?}",
            interval.1, MAX_DEMO_INTERVAL
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Builder)]
pub struct ArcGaugeConfig {
    /// Percentage, 0-100.
    #[builder(default = 0.0)]
    pub value: f64,
    #[builder(default = 200.0)]
    pub size: f64,
    #[builder(default = 48.0)]
    pub thickness: f64,
    #[builder(default = Color::hex(0x42a5f5))]
    pub color: Color,
    #[builder(default = Color::hex(0xe0e0e0))]
    pub background_color: Color,
    /// Defaults to the animated value with one decimal and a `%` sign.
    pub label: Option<Label>,
    /// Seconds.
    #[builder(default = 1.0)]
    pub duration: f64,
    #[builder(default = false)]
    pub demo_mode: bool,
    #[builder(default = ARC_DEMO_INTERVAL)]
    pub demo_interval: (Duration, Duration),
    pub demo_seed: Option<u64>,
}

impl Default for ArcGaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ArcGaugeConfig {
    pub fn validate(&self) -> Result<(), GaugeError> {
        check_finite("value", self.value)?;
        check_finite("size", self.size)?;
        check_finite("thickness", self.thickness)?;
        check_duration(self.duration)?;
        check_interval(self.demo_interval)
    }
}

#[derive(Debug, Clone, Builder)]
pub struct BarGaugeConfig {
    #[builder(default = 0.0)]
    pub value: f64,
    /// Threshold splitting the fill into normal and over segments.
    pub target: f64,
    #[builder(default = 100.0)]
    pub total: f64,
    #[builder(default = 200.0)]
    pub width: f64,
    #[builder(default = 48.0)]
    pub height: f64,
    #[builder(default = Color::hex(0x2e7d32))]
    pub fill_color: Color,
    #[builder(default = Color::hex(0xc62828))]
    pub over_color: Color,
    #[builder(default = Color::hex(0xe0e0e0))]
    pub background_color: Color,
    #[builder(default = 1.0)]
    pub duration: f64,
    #[builder(default = false)]
    pub demo_mode: bool,
    #[builder(default = BAR_DEMO_INTERVAL)]
    pub demo_interval: (Duration, Duration),
    pub demo_seed: Option<u64>,
}

impl BarGaugeConfig {
    pub fn validate(&self) -> Result<(), GaugeError> {
        for (name, value) in [
            ("value", self.value),
            ("target", self.target),
            ("total", self.total),
            ("width", self.width),
            ("height", self.height),
        ] {
            check_finite(name, value)?;
        }
        if self.total <= 0.0 {
            return Err(GaugeError::InvalidConfig(format!(
                "total must be positive, got {}",
                self.total
            )));
        }
        check_duration(self.duration)?;
        check_interval(self.demo_interval)
    }
}

#[derive(Debug, Clone, Builder)]
pub struct ColumnGaugeConfig {
    #[builder(default = 0.0)]
    pub value: f64,
    pub target: f64,
    #[builder(default = 100.0)]
    pub total: f64,
    #[builder(default = 68.0)]
    pub width: f64,
    #[builder(default = 200.0)]
    pub height: f64,
    #[builder(default = Color::hex(0x2e7d32))]
    pub fill_color: Color,
    #[builder(default = Color::hex(0xc62828))]
    pub over_color: Color,
    #[builder(default = Color::hex(0xe0e0e0))]
    pub background_color: Color,
    #[builder(default = 1.0)]
    pub duration: f64,
    #[builder(default = false)]
    pub demo_mode: bool,
    #[builder(default = COLUMN_DEMO_INTERVAL)]
    pub demo_interval: (Duration, Duration),
    pub demo_seed: Option<u64>,
}

impl ColumnGaugeConfig {
    pub fn validate(&self) -> Result<(), GaugeError> {
        for (name, value) in [
            ("value", self.value),
            ("target", self.target),
            ("total", self.total),
            ("width", self.width),
            ("height", self.height),
        ] {
            check_finite(name, value)?;
        }
        if self.total <= 0.0 {
            return Err(GaugeError::InvalidConfig(format!(
                "total must be positive, got {}",
                self.total
            )));
        }
        check_duration(self.duration)?;
        check_interval(self.demo_interval)
    }
}

#[derive(Debug, Clone, Builder)]
pub struct TorusGaugeConfig {
    /// Percentage, 0-100.
    #[builder(default = 0.0)]
    pub value: f64,
    #[builder(default)]
    pub thresholds: Thresholds,
    /// Band colours: at or above `high`, between, below `low`.
    #[builder(default = [Color::hex(0x2e7d32), Color::hex(0xfbc02d), Color::hex(0xc62828)])]
    pub band_colors: [Color; 3],
    #[builder(default = Color::hex(0xe5e7eb))]
    pub background_color: Color,
    #[builder(default = 140.0)]
    pub size: f64,
    #[builder(default = 18.0)]
    pub thickness: f64,
    /// Defaults to the rounded animated value with a `%` sign.
    pub label: Option<Label>,
    #[builder(default = 1.1)]
    pub duration: f64,
    #[builder(default = false)]
    pub demo_mode: bool,
    #[builder(default = TORUS_DEMO_INTERVAL)]
    pub demo_interval: (Duration, Duration),
    pub demo_seed: Option<u64>,
}

impl Default for TorusGaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TorusGaugeConfig {
    pub fn validate(&self) -> Result<(), GaugeError> {
        check_finite("value", self.value)?;
        check_finite("low threshold", self.thresholds.low)?;
        check_finite("high threshold", self.thresholds.high)?;
        if self.thresholds.low > self.thresholds.high {
            return Err(GaugeError::InvalidConfig(format!(
                "low threshold {} exceeds high threshold {}",
                self.thresholds.low, self.thresholds.high
            )));
        }
        check_finite("size", self.size)?;
        check_finite("thickness", self.thickness)?;
        check_duration(self.duration)?;
        check_interval(self.demo_interval)
    }
}

#[derive(Debug, Clone, Builder)]
pub struct SpeedometerConfig {
    #[builder(default = 0.0)]
    pub value: f64,
    #[builder(default = 0.0)]
    pub min: f64,
    #[builder(default = 10.0)]
    pub max: f64,
    #[builder(default = 220.0)]
    pub width: f64,
    #[builder(default = 190.0)]
    pub height: f64,
    #[builder(default = 11)]
    pub tick_count: usize,
    /// Label every n-th tick.
    #[builder(default = 1)]
    pub label_step: usize,
    /// Degrees clockwise from 12 o'clock.
    #[builder(default = -110.0)]
    pub arc_start: f64,
    #[builder(default = 220.0)]
    pub arc_sweep: f64,
    #[builder(default)]
    pub spring: SpringParams,
    #[builder(into)]
    pub caption: Option<String>,
    #[builder(default = Color::hex(0xff0000))]
    pub needle_color: Color,
    #[builder(default = Color::hex(0xe5e7eb))]
    pub arc_color: Color,
    #[builder(default = Color::hex(0x9ca3af))]
    pub tick_color: Color,
    #[builder(default = Color::hex(0x1f2937))]
    pub text_color: Color,
    #[builder(default = false)]
    pub demo_mode: bool,
    #[builder(default = SPEEDOMETER_DEMO_INTERVAL)]
    pub demo_interval: (Duration, Duration),
    pub demo_seed: Option<u64>,
}

impl Default for SpeedometerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SpeedometerConfig {
    pub fn validate(&self) -> Result<(), GaugeError> {
        for (name, value) in [
            ("value", self.value),
            ("min", self.min),
            ("max", self.max),
            ("width", self.width),
            ("height", self.height),
            ("arc start", self.arc_start),
            ("arc sweep", self.arc_sweep),
        ] {
            check_finite(name, value)?;
        }
        if self.min >= self.max {
            return Err(GaugeError::InvalidConfig(format!(
                "min {} must be below max {}",
                self.min, self.max
            )));
        }
        if self.label_step == 0 {
            return Err(GaugeError::InvalidConfig("label step must be at least 1".to_string()));
        }
        if self.spring.mass <= 0.0 {
            return Err(GaugeError::InvalidConfig(format!(
                "spring mass must be positive, got {}",
                self.spring.mass
            )));
        }
        check_interval(self.demo_interval)
    }
}

/// Window settings of the dashboard binary.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub max_framerate: f64,
    pub background: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Movie Dashboard".to_string(),
            width: 900,
            height: 520,
            max_framerate: 60.0,
            background: Color::WHITE,
        }
    }
}

/// Where each gauge sits on the dashboard.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub margin: f64,
    pub gap: f64,
    pub row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 24.0,
            gap: 32.0,
            row_height: 240.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_documented_values() {
        let arc = ArcGaugeConfig::default();
        assert_eq!((arc.size, arc.thickness, arc.duration), (200.0, 48.0, 1.0));
        assert!(!arc.demo_mode);
        assert!(arc.label.is_none());

        let bar = BarGaugeConfig::builder().target(50.0).build();
        assert_eq!((bar.total, bar.width, bar.height), (100.0, 200.0, 48.0));

        let column = ColumnGaugeConfig::builder().target(50.0).build();
        assert_eq!((column.width, column.height), (68.0, 200.0));

        let torus = TorusGaugeConfig::default();
        assert_eq!(torus.thresholds, Thresholds { low: 30.0, high: 70.0 });
        assert_eq!(torus.duration, 1.1);

        let speedometer = SpeedometerConfig::default();
        assert_eq!((speedometer.min, speedometer.max), (0.0, 10.0));
        assert_eq!((speedometer.tick_count, speedometer.label_step), (11, 1));
        assert_eq!(speedometer.spring, SpringParams::default());
    }

    #[test]
    fn validation_rejects_malformed_configs() {
        assert!(SpeedometerConfig::builder().min(5.0).max(5.0).build().validate().is_err());
        assert!(SpeedometerConfig::builder().label_step(0).build().validate().is_err());
        assert!(BarGaugeConfig::builder().target(1.0).total(0.0).build().validate().is_err());
        assert!(ArcGaugeConfig::builder().duration(-1.0).build().validate().is_err());
        assert!(ArcGaugeConfig::builder().value(f64::NAN).build().validate().is_err());
        assert!(TorusGaugeConfig::builder()
            .thresholds(Thresholds { low: 80.0, high: 20.0 })
            .build()
            .validate()
            .is_err());
        assert!(ColumnGaugeConfig::builder()
            .target(1.0)
            .demo_interval((Duration::from_secs(5), Duration::from_secs(1)))
            .build()
            .validate()
            .is_err());
    }

    #[test]
    fn validation_rejects_unrepresentable_spans() {
        assert!(TorusGaugeConfig::builder().duration(1e30).build().validate().is_err());
        assert!(ArcGaugeConfig::builder().duration(1e30).build().validate().is_err());
        assert!(TorusGaugeConfig::builder().duration(3600.0).build().validate().is_ok());
        assert!(SpeedometerConfig::builder()
            .demo_interval((Duration::from_secs(1), Duration::MAX))
            .build()
            .validate()
            .is_err());
        assert!(BarGaugeConfig::builder()
            .target(1.0)
            .demo_interval((Duration::from_secs(1), MAX_DEMO_INTERVAL))
            .build()
            .validate()
            .is_ok());
    }

    #[test]
    fn out_of_range_values_are_not_config_errors() {
        assert!(SpeedometerConfig::builder().value(12.0).build().validate().is_ok());
        assert!(ArcGaugeConfig::builder().value(250.0).build().validate().is_ok());
    }

    #[test]
    fn labels_render_text_or_format() {
        assert_eq!(Label::text("ok").render(3.0), "ok");
        let label = Label::format(|v| format!("{v:.0} films"));
        assert_eq!(label.render(41.6), "42 films");
        assert_eq!(format!("{label:?}"), "Format(..)");
    }
}
