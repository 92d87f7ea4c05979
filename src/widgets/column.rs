//! Vertical counterpart of the bar gauge, filling upwards from the bottom.

use super::{format_reading, AXIS_TEXT, MARKER, VALUE_TEXT};
use crate::animation::Motion;
use crate::config::ColumnGaugeConfig;
use crate::error::GaugeError;
use crate::gauge::{DriverOptions, Gauge, GaugeDriver};
use crate::geometry::{fill_extent_for_value, FillExtent, Point, Rect};
use crate::scene::{Anchor, DrawCommand, Scene};
use crate::scheduler::Scheduler;

const TRACK_Y: f64 = 16.0;
const MARKER_OVERHANG: f64 = 5.0;

pub struct ColumnGauge {
    config: ColumnGaugeConfig,
    driver: GaugeDriver,
}

impl ColumnGauge {
    pub fn new(config: ColumnGaugeConfig, scheduler: &Scheduler) -> Result<Self, GaugeError> {
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

    pub fn config(&self) -> &ColumnGaugeConfig {
        &self.config
    }

    pub fn track(&self) -> Rect {
        Rect::new(
            self.config.width * 0.35,
            TRACK_Y,
            self.config.width * 0.3,
            self.config.height - 2.0 * TRACK_Y,
        )
    }

    /// Extents measured upwards from the bottom of the track.
    pub fn fill_extent(&self) -> FillExtent {
        fill_extent_for_value(
            self.driver.displayed(),
            self.config.target,
            self.config.total,
            self.track().height,
        )
    }
}

impl Gauge for ColumnGauge {
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
        (self.config.width * 2.0, self.config.height)
    }

    fn scene(&self) -> Scene {
        let (width, height) = self.size();
        let w = self.config.width;
        let track = self.track();
        let bottom = track.y + track.height;
        let extent = self.fill_extent();
        let mut scene = Scene::new(width, height);

        scene.add_command(DrawCommand::Rect {
            rect: track,
            color: self.config.background_color,
        });
        scene.add_command(DrawCommand::Rect {
            rect: Rect::new(track.x, bottom - extent.normal, track.width, extent.normal),
            color: self.config.fill_color,
        });
        if extent.is_over() {
            scene.add_command(DrawCommand::Rect {
                rect: Rect::new(track.x, bottom - extent.filled(), track.width, extent.over),
                color: self.config.over_color,
            });
        }

        let target_y = bottom - extent.target;
        scene.add_command(DrawCommand::Line {
            from: Point::new(track.x - MARKER_OVERHANG, target_y),
            to: Point::new(track.x + track.width + MARKER_OVERHANG, target_y),
            width: 3.0,
            dash: Some((4.0, 3.0)),
            color: MARKER,
        });

        let fill_top = bottom - extent.filled();
        scene.add_command(DrawCommand::Text {
            at: Point::new(track.x + track.width / 0.8, fill_top - 2.0),
            text: format_reading(self.driver.reading().round()),
            size: w * 0.34,
            anchor: Anchor::Start,
            bold: true,
            color: VALUE_TEXT,
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(track.x - 10.0, target_y + 1.0),
            text: format_reading(self.config.target),
            size: w * 0.2,
            anchor: Anchor::End,
            bold: false,
            color: AXIS_TEXT,
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(track.x - MARKER_OVERHANG, track.y + 2.0),
            text: format_reading(self.config.total),
            size: w * 0.2,
            anchor: Anchor::End,
            bold: false,
            color: AXIS_TEXT,
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(track.x - 10.0, bottom),
            text: "0".to_string(),
            size: w * 0.2,
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
    use std::time::Duration;

    fn settle(scheduler: &Scheduler) {
        for _ in 0..120 {
            scheduler.advance(Duration::from_millis(16));
        }
    }

    #[test]
    fn fill_grows_from_the_bottom() {
        let scheduler = Scheduler::new();
        let config = ColumnGaugeConfig::builder().value(40.0).target(80.0).build();
        let gauge = ColumnGauge::new(config.clone(), &scheduler).unwrap();
        settle(&scheduler);

        let track = gauge.track();
        let fill = gauge
            .scene()
            .commands()
            .iter()
            .find_map(|command| match command {
                DrawCommand::Rect { rect, color } if *color == config.fill_color => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert!((fill.y + fill.height - (track.y + track.height)).abs() < 1e-9);
        assert!((fill.height - track.height * 0.4).abs() < 1e-9);
    }

    #[test]
    fn over_segment_stacks_above_target() {
        let scheduler = Scheduler::new();
        let config = ColumnGaugeConfig::builder().value(90.0).target(60.0).build();
        let gauge = ColumnGauge::new(config.clone(), &scheduler).unwrap();
        settle(&scheduler);

        let track = gauge.track();
        let extent = gauge.fill_extent();
        assert!((extent.normal - track.height * 0.6).abs() < 1e-9);
        assert!((extent.over - track.height * 0.3).abs() < 1e-9);

        let over = gauge
            .scene()
            .commands()
            .iter()
            .find_map(|command| match command {
                DrawCommand::Rect { rect, color } if *color == config.over_color => Some(*rect),
                _ => None,
            })
            .unwrap();
        let target_y = track.y + track.height - extent.target;
        assert!((over.y + over.height - target_y).abs() < 1e-9);
    }

    #[test]
    fn layout_matches_default_dimensions() {
        let scheduler = Scheduler::new();
        let gauge = ColumnGauge::new(ColumnGaugeConfig::builder().target(50.0).build(), &scheduler).unwrap();
        assert_eq!(gauge.size(), (136.0, 200.0));
        let track = gauge.track();
        assert_eq!((track.y, track.height), (16.0, 168.0));
        assert!(gauge.scene().texts().any(|t| t == "100"));
    }

    #[test]
    fn value_label_shows_the_reading_before_the_fill_settles() {
        let scheduler = Scheduler::new();
        let gauge = ColumnGauge::new(ColumnGaugeConfig::builder().value(63.4).target(50.0).build(), &scheduler).unwrap();
        scheduler.advance(Duration::from_millis(16));
        assert!(gauge.displayed_value() < 0.5);
        assert!(gauge.scene().texts().any(|t| t == "63"));
    }
}
