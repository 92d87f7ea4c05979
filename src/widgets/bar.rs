//! Horizontal bar with a target marker. The part of the fill beyond the
//! target is drawn in the over colour.

use super::{format_reading, AXIS_TEXT, MARKER, VALUE_TEXT};
use crate::animation::Motion;
use crate::config::BarGaugeConfig;
use crate::error::GaugeError;
use crate::gauge::{DriverOptions, Gauge, GaugeDriver};
use crate::geometry::{fill_extent_for_value, FillExtent, Point, Rect};
use crate::scene::{Anchor, DrawCommand, Scene};
use crate::scheduler::Scheduler;

const TRACK_X: f64 = 32.0;
const TRACK_INSET: f64 = 48.0;
const MARKER_OVERHANG: f64 = 8.0;
const MARKER_DASH: (f64, f64) = (4.0, 3.0);

pub struct BarGauge {
    config: BarGaugeConfig,
    driver: GaugeDriver,
}

impl BarGauge {
    pub fn new(config: BarGaugeConfig, scheduler: &Scheduler) -> Result<Self, GaugeError> {
        config.validate()?;
        let driver = GaugeDriver::new(
            scheduler,
            DriverOptions {
                range: (0.0, config.total),
                value: config.value,
                demo_mode: config.demo_mode,
                demo_interval: config.demo_interval,
                demo_seed: config.demo_seed,
                motion: Motion::eased(0.0, config.duration),
                projection: Box::new(|value| value),
            },
        );
        Ok(Self { config, driver })
    }

    pub fn config(&self) -> &BarGaugeConfig {
        &self.config
    }

    /// The empty track the fill grows along.
    pub fn track(&self) -> Rect {
        Rect::new(
            TRACK_X,
            self.config.height * 0.35,
            self.config.width - TRACK_INSET,
            self.config.height * 0.3,
        )
    }

    pub fn fill_extent(&self) -> FillExtent {
        fill_extent_for_value(
            self.driver.displayed(),
            self.config.target,
            self.config.total,
            self.track().width,
        )
    }
}

impl Gauge for BarGauge {
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
        (self.config.width, self.config.height * 2.0)
    }

    fn scene(&self) -> Scene {
        let (width, height) = self.size();
        let h = self.config.height;
        let track = self.track();
        let extent = self.fill_extent();
        let mut scene = Scene::new(width, height);

        scene.add_command(DrawCommand::Rect {
            rect: track,
            color: self.config.background_color,
        });
        scene.add_command(DrawCommand::Rect {
            rect: Rect::new(track.x, track.y, extent.normal, track.height),
            color: self.config.fill_color,
        });
        if extent.is_over() {
            scene.add_command(DrawCommand::Rect {
                rect: Rect::new(track.x + extent.normal, track.y, extent.over, track.height),
                color: self.config.over_color,
            });
        }

        let target_x = track.x + extent.target;
        scene.add_command(DrawCommand::Line {
            from: Point::new(target_x, track.y - MARKER_OVERHANG),
            to: Point::new(target_x, track.y + track.height + MARKER_OVERHANG),
            width: 3.0,
            dash: Some(MARKER_DASH),
            color: MARKER,
        });

        let fill_end = track.x + extent.filled();
        scene.add_command(DrawCommand::Text {
            at: Point::new(fill_end.max(track.x + 12.0), track.y + track.height + h * 0.75),
            text: format_reading(self.driver.reading().round()),
            size: h * 0.5,
            anchor: Anchor::Middle,
            bold: true,
            color: VALUE_TEXT,
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(target_x, track.y - MARKER_OVERHANG - 4.0),
            text: format_reading(self.config.target),
            size: h * 0.3,
            anchor: Anchor::Middle,
            bold: false,
            color: AXIS_TEXT,
        });

        let axis_y = track.y + track.height * 0.75;
        scene.add_command(DrawCommand::Text {
            at: Point::new(track.x - 6.0, axis_y),
            text: "0".to_string(),
            size: h * 0.3,
            anchor: Anchor::End,
            bold: false,
            color: AXIS_TEXT,
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(track.x + track.width + 6.0, axis_y),
            text: format_reading(self.config.total),
            size: h * 0.3,
            anchor: Anchor::Start,
            bold: false,
            color: AXIS_TEXT,
        });
        scene
    }

    fn teardown(&mut self) {
        self.driver.teardown();
    }
}
