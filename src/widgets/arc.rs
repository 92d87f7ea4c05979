//! Semicircular percentage gauge.

use super::{AXIS_TEXT, VALUE_TEXT};
use crate::animation::Motion;
use crate::config::ArcGaugeConfig;
use crate::error::GaugeError;
use crate::gauge::{DriverOptions, Gauge, GaugeDriver};
use crate::geometry::{arc_path, zero_reference, Point};
use crate::scene::{Anchor, DrawCommand, Scene};
use crate::scheduler::Scheduler;

const SWEEP_DEG: f64 = 180.0;

pub struct ArcGauge {
    config: ArcGaugeConfig,
    driver: GaugeDriver,
}

impl ArcGauge {
    pub fn new(config: ArcGaugeConfig, scheduler: &Scheduler) -> Result<Self, GaugeError> {
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

    pub fn config(&self) -> &ArcGaugeConfig {
        &self.config
    }

    pub fn radius(&self) -> f64 {
        ((self.config.size - self.config.thickness) / 2.0).max(0.0)
    }

    fn center(&self) -> Point {
        Point::new(self.config.size / 2.0, self.config.size / 2.0)
    }

    fn start_deg() -> f64 {
        zero_reference::to_clock(zero_reference::ARC_DEG)
    }

    /// End angle of the filled portion for the animated percentage.
    pub fn fill_end_deg(&self) -> f64 {
        Self::start_deg() + self.driver.displayed().clamp(0.0, 100.0) / 100.0 * SWEEP_DEG
    }

    /// Centre text, from the animated percentage rounded to one decimal.
    pub fn label_text(&self) -> String {
        let shown = (self.driver.displayed() * 10.0).round() / 10.0;
        match &self.config.label {
            Some(label) => label.render(shown),
            None => format!("{shown:.1}%"),
        }
    }
}

impl Gauge for ArcGauge {
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
        let thickness = self.config.thickness;
        let radius = self.radius();
        let center = self.center();
        let start = Self::start_deg();
        let mut scene = Scene::new(size, size);

        scene.add_command(DrawCommand::Arc {
            path: arc_path(start, start + SWEEP_DEG, radius, center),
            thickness,
            color: self.config.background_color,
        });
        let fill = arc_path(start, self.fill_end_deg(), radius, center);
        if !fill.is_degenerate() {
            scene.add_command(DrawCommand::Arc {
                path: fill,
                thickness,
                color: self.config.color,
            });
        }

        scene.add_command(DrawCommand::Text {
            at: Point::new(center.x, center.y + thickness * 0.3),
            text: self.label_text(),
            size: size * 0.15,
            anchor: Anchor::Middle,
            bold: true,
            color: VALUE_TEXT,
        });

        let axis_y = center.y + radius * 0.3;
        let axis_size = size * 0.07;
        scene.add_command(DrawCommand::Text {
            at: Point::new(thickness / 4.0 + 4.0, axis_y),
            text: "0".to_string(),
            size: axis_size,
            anchor: Anchor::Start,
            bold: false,
            color: AXIS_TEXT,
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(size - thickness / 4.0, axis_y),
            text: "100".to_string(),
            size: axis_size,
            anchor: Anchor::End,
            bold: false,
            color: AXIS_TEXT,
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
    fn fill_sweeps_half_circle_proportionally() {
        let scheduler = Scheduler::new();
        let gauge = ArcGauge::new(ArcGaugeConfig::builder().value(50.0).build(), &scheduler).unwrap();
        assert_eq!(gauge.fill_end_deg(), -90.0);
        settle(&scheduler);
        assert!((gauge.fill_end_deg() - 0.0).abs() < 1e-9);
        assert_eq!(gauge.label_text(), "50.0%");
        assert_eq!(gauge.radius(), 76.0);
    }

    #[test]
    fn out_of_range_values_clamp_to_full_scale() {
        let scheduler = Scheduler::new();
        let gauge = ArcGauge::new(ArcGaugeConfig::builder().value(180.0).build(), &scheduler).unwrap();
        assert_eq!(gauge.reading(), 100.0);
        settle(&scheduler);
        assert_eq!(gauge.fill_end_deg(), 90.0);
    }

    #[test]
    fn zero_value_draws_only_the_track() {
        let scheduler = Scheduler::new();
        let gauge = ArcGauge::new(ArcGaugeConfig::default(), &scheduler).unwrap();
        let arcs = gauge
            .scene()
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Arc { .. }))
            .count();
        assert_eq!(arcs, 1);
        let texts: Vec<_> = gauge.scene().texts().map(str::to_owned).collect();
        assert_eq!(texts, ["0.0%", "0", "100"]);
    }

    #[test]
    fn custom_label_formats_animated_value() {
        let scheduler = Scheduler::new();
        let gauge = ArcGauge::new(
            ArcGaugeConfig::builder()
                .value(30.0)
                .label(Label::format(|v| format!("{v:.0} of 100")))
                .build(),
            &scheduler,
        )
        .unwrap();
        settle(&scheduler);
        assert_eq!(gauge.label_text(), "30 of 100");
    }

    #[test]
    fn formatter_receives_value_rounded_to_one_decimal() {
        let scheduler = Scheduler::new();
        let gauge = ArcGauge::new(
            ArcGaugeConfig::builder()
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
        assert_eq!(seen, (shown * 10.0).round() / 10.0);
        assert_eq!((seen * 10.0).round() / 10.0, seen);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let scheduler = Scheduler::new();
        let result = ArcGauge::new(ArcGaugeConfig::builder().size(f64::INFINITY).build(), &scheduler);
        assert!(matches!(result, Err(GaugeError::InvalidConfig(_))));
    }
}
