//! Full-ring percentage gauge whose colour follows threshold bands.

use super::VALUE_TEXT;
use crate::animation::Motion;
use crate::config::{Thresholds, TorusGaugeConfig};
use crate::error::GaugeError;
use crate::gauge::{DriverOptions, Gauge, GaugeDriver};
use crate::geometry::{dash_offset_for_percent, zero_reference, Point};
use crate::scene::{Anchor, DrawCommand, Scene};
use crate::scheduler::Scheduler;
use crate::Color;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// At or above the high threshold.
    High,
    Middle,
    /// Below the low threshold.
    Low,
}

impl Band {
    pub fn for_value(value: f64, thresholds: Thresholds) -> Self {
        if value < thresholds.low {
            Band::Low
        } else if value < thresholds.high {
            Band::Middle
        } else {
            Band::High
        }
    }

    fn index(self) -> usize {
        match self {
            Band::High => 0,
            Band::Middle => 1,
            Band::Low => 2,
        }
    }
}

pub struct TorusGauge {
    config: TorusGaugeConfig,
    driver: GaugeDriver,
}

impl TorusGauge {
    pub fn new(config: TorusGaugeConfig, scheduler: &Scheduler) -> Result<Self, GaugeError> {
        config.validate()?;
        let driver = GaugeDriver::new(
            scheduler,
            DriverOptions {
                range: (0.0, 100.0),
                value: config.value,
                demo_mode: config.demo_mode,
                demo_interval: config.demo_interval,
                demo_seed: config.demo_seed,
                motion: Motion::eased(0.0, config.duration),
                projection: Box::new(|pct| pct),
            },
        );
        Ok(Self { config, driver })
    }

    pub fn config(&self) -> &TorusGaugeConfig {
        &self.config
    }

    pub fn radius(&self) -> f64 {
        ((self.config.size - self.config.thickness) / 2.0).max(0.0)
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius()
    }

    /// Band of the current reading. The ring switches colour as soon as a new
    /// reading arrives, not when the animation crosses a threshold.
    pub fn band(&self) -> Band {
        Band::for_value(self.driver.reading(), self.config.thresholds)
    }

    pub fn ring_color(&self) -> Color {
        self.config.band_colors[self.band().index()]
    }

    pub fn dash_offset(&self) -> f64 {
        dash_offset_for_percent(self.driver.displayed(), self.circumference())
    }

    /// Centre text, from the animated percentage rounded to a whole number.
    pub fn label_text(&self) -> String {
        let shown = self.driver.displayed().round();
        match &self.config.label {
            Some(label) => label.render(shown),
            None => format!("{}%", shown as i64),
        }
    }
}

impl Gauge for TorusGauge {
    fn set_value(&mut self, value: f64) {
        self.driver.set_value(value);
    }

    fn set_demo_mode(&mut self, enabled: bool) {
        self.driver.set_demo_mode(enabled);
    }

    fn reading(&self) -> f64 {
        self.driver.reading()
    }

    fn displayed_value(&self) -> f64 {
        self.driver.displayed()
    }

    fn size(&self) -> (f64, f64) {
        (self.config.size, self.config.size)
    }

    fn scene(&self) -> Scene {
        let size = self.config.size;
        let center = Point::new(size / 2.0, size / 2.0);
        let mut scene = Scene::new(size, size);

        scene.add_command(DrawCommand::Ring {
            center,
            radius: self.radius(),
            thickness: self.config.thickness,
            rotation_deg: zero_reference::TORUS_DEG,
            dash_offset: None,
            color: self.config.background_color,
        });
        scene.add_command(DrawCommand::Ring {
            center,
            radius: self.radius(),
            thickness: self.config.thickness,
            rotation_deg: zero_reference::TORUS_DEG,
            dash_offset: Some(self.dash_offset()),
            color: self.ring_color(),
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(center.x, center.y + size * 0.08),
            text: self.label_text(),
            size: size * 0.23,
            anchor: Anchor::Middle,
            bold: true,
            color: VALUE_TEXT,
        });
        scene
    }

    fn teardown(&mut self) {
        self.driver.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Label;
    use std::time::Duration;

    fn settle(scheduler: &Scheduler) {
        for _ in 0..120 {
            scheduler.advance(Duration::from_millis(16));
        }
    }

    #[test]
    fn value_below_low_threshold_uses_low_band_colour() {
        let scheduler = Scheduler::new();
        let config = TorusGaugeConfig::builder()
            .value(29.0)
            .thresholds(Thresholds { low: 33.0, high: 66.0 })
            .build();
        let gauge = TorusGauge::new(config.clone(), &scheduler).unwrap();
        assert_eq!(gauge.band(), Band::Low);
        assert_eq!(gauge.ring_color(), config.band_colors[2]);
    }

    #[test]
    fn bands_split_on_thresholds() {
        let t = Thresholds { low: 30.0, high: 70.0 };
        assert_eq!(Band::for_value(29.9, t), Band::Low);
        assert_eq!(Band::for_value(30.0, t), Band::Middle);
        assert_eq!(Band::for_value(69.9, t), Band::Middle);
        assert_eq!(Band::for_value(70.0, t), Band::High);
    }

    #[test]
    fn band_follows_reading_before_animation_finishes() {
        let scheduler = Scheduler::new();
        let mut gauge = TorusGauge::new(TorusGaugeConfig::builder().value(10.0).build(), &scheduler).unwrap();
        settle(&scheduler);
        gauge.set_value(90.0);
        scheduler.advance(Duration::from_millis(16));
        assert!(gauge.displayed_value() < 70.0);
        assert_eq!(gauge.band(), Band::High);
    }

    #[test]
    fn dash_offset_reveals_the_settled_percentage() {
        let scheduler = Scheduler::new();
        let gauge = TorusGauge::new(TorusGaugeConfig::builder().value(25.0).build(), &scheduler).unwrap();
        assert!((gauge.dash_offset() - gauge.circumference()).abs() < 1e-9);
        settle(&scheduler);
        assert!((gauge.dash_offset() - gauge.circumference() * 0.75).abs() < 1e-9);
        assert_eq!(gauge.label_text(), "25%");
    }

    #[test]
    fn formatter_receives_whole_percentage_mid_animation() {
        let scheduler = Scheduler::new();
        let gauge = TorusGauge::new(
            TorusGaugeConfig::builder()
                .value(77.0)
                .label(Label::format(|v| format!("{v}")))
                .build(),
            &scheduler,
        )
        .unwrap();
        for _ in 0..20 {
            scheduler.advance(Duration::from_millis(16));
        }
        let shown = gauge.displayed_value();
        assert!(shown > 0.0 && shown < 77.0);

        let seen: f64 = gauge.label_text().parse().unwrap();
        assert_eq!(seen, shown.round());
    }

    #[test]
    fn overlong_duration_is_a_config_error() {
        let scheduler = Scheduler::new();
        let result = TorusGauge::new(TorusGaugeConfig::builder().duration(1e30).build(), &scheduler);
        assert!(matches!(result, Err(GaugeError::InvalidConfig(_))));
    }
}
