//! Needle dial driven by a spring. The animated quantity is the needle angle.

use super::format_reading;
use crate::animation::Motion;
use crate::config::SpeedometerConfig;
use crate::error::GaugeError;
use crate::gauge::{DriverOptions, Gauge, GaugeDriver};
use crate::geometry::{arc_path, needle_angle, polar, tick_positions, Point, Tick};
use crate::scene::{Anchor, DrawCommand, Scene};
use crate::scheduler::Scheduler;
use crate::Color;

const ARC_WIDTH: f64 = 16.0;
const TICK_WIDTH: f64 = 6.0;
const NEEDLE_WIDTH: f64 = 5.0;
const HUB_RADIUS: f64 = 17.0;
const HUB_STROKE: f64 = 4.0;
const HUB_COLOR: Color = Color::hex(0x666666);

pub struct Speedometer {
    config: SpeedometerConfig,
    driver: GaugeDriver,
}

impl Speedometer {
    pub fn new(config: SpeedometerConfig, scheduler: &Scheduler) -> Result<Self, GaugeError> {
        config.validate()?;
        let (min, max) = (config.min, config.max);
        let (start, sweep) = (config.arc_start, config.arc_sweep);
        let driver = GaugeDriver::new(
            scheduler,
            DriverOptions {
                range: (min, max),
                value: config.value,
                demo_mode: config.demo_mode,
                demo_interval: config.demo_interval,
                demo_seed: config.demo_seed,
                motion: Motion::spring(start, config.spring),
                projection: Box::new(move |value| needle_angle(value, min, max, start, sweep)),
            },
        );
        Ok(Self { config, driver })
    }

    pub fn config(&self) -> &SpeedometerConfig {
        &self.config
    }

    pub fn center(&self) -> Point {
        Point::new(self.config.width / 2.0, self.config.height * 0.72)
    }

    pub fn radius(&self) -> f64 {
        self.config.width.min(self.config.height) * 0.42
    }

    pub fn needle_length(&self) -> f64 {
        self.radius() * 1.04
    }

    /// Current needle angle, degrees clockwise from 12 o'clock.
    pub fn needle_angle(&self) -> f64 {
        self.driver.displayed()
    }

    pub fn needle_tip(&self) -> Point {
        polar(self.center(), self.needle_length(), self.needle_angle())
    }

    pub fn ticks(&self) -> Vec<Tick> {
        tick_positions(
            self.config.tick_count,
            self.config.arc_start,
            self.config.arc_sweep,
            self.center(),
            self.radius() * 0.92,
            self.needle_length(),
            (self.config.min, self.config.max),
        )
    }
}

impl Gauge for Speedometer {
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
        (self.config.width, self.config.height)
    }

    fn scene(&self) -> Scene {
        let config = &self.config;
        let center = self.center();
        let radius = self.radius();
        let mut scene = Scene::new(config.width, config.height);

        scene.add_command(DrawCommand::Arc {
            path: arc_path(config.arc_start, config.arc_start + config.arc_sweep, radius, center),
            thickness: ARC_WIDTH,
            color: config.arc_color,
        });

        for (i, tick) in self.ticks().iter().enumerate() {
            scene.add_command(DrawCommand::Line {
                from: tick.inner,
                to: tick.outer,
                width: TICK_WIDTH,
                dash: None,
                color: config.tick_color,
            });
            if i % config.label_step == 0 {
                let at = polar(center, radius * 1.18, tick.angle);
                scene.add_command(DrawCommand::Text {
                    at: Point::new(at.x, at.y + 8.0),
                    text: tick.label_value.to_string(),
                    size: 20.0,
                    anchor: Anchor::Middle,
                    bold: false,
                    color: config.text_color,
                });
            }
        }

        scene.add_command(DrawCommand::Text {
            at: Point::new(center.x, center.y - radius * 0.3),
            text: format_reading(self.driver.reading()),
            size: 38.0,
            anchor: Anchor::Middle,
            bold: true,
            color: config.text_color,
        });

        scene.add_command(DrawCommand::Line {
            from: center,
            to: self.needle_tip(),
            width: NEEDLE_WIDTH,
            dash: None,
            color: config.needle_color,
        });
        scene.add_command(DrawCommand::Circle {
            center,
            radius: HUB_RADIUS + HUB_STROKE / 2.0,
            color: Color::WHITE,
        });
        scene.add_command(DrawCommand::Circle {
            center,
            radius: HUB_RADIUS - HUB_STROKE / 2.0,
            color: HUB_COLOR,
        });

        if let Some(caption) = &config.caption {
            scene.add_command(DrawCommand::Text {
                at: Point::new(center.x, center.y + radius * 0.4),
                text: caption.clone(),
                size: 20.0,
                anchor: Anchor::Middle,
                bold: false,
                color: config.text_color,
            });
        }
        scene
    }

    fn teardown(&mut self) {
        self.driver.teardown();
    }
}
