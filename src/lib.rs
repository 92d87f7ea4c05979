// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

//! Animated gauges for a movie catalog dashboard.
//!
//! Each gauge variant turns a clamped reading into an animated displayed value
//! and a retained-mode [`Scene`], driven by a single-threaded [`Scheduler`].
//! Scenes can be rasterized into a window frame buffer or written out as SVG.

pub mod animation;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gauge;
pub mod geometry;
pub mod raster;
pub mod scene;
pub mod scheduler;
pub mod source;
pub mod widgets;

use std::fmt;

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From `0xRRGGBB`.
    pub const fn hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

pub use animation::{Easing, Motion, Phase, Spring, SpringParams, Tween};
pub use catalog::{
    Actor, ActorStore, CatalogApi, DashboardStats, InMemoryApi, JsonFilePersistence,
    MemoryPersistence, Movie, MovieStore, Persistence,
};
pub use config::{
    ArcGaugeConfig, BarGaugeConfig, ColumnGaugeConfig, Label, LayoutConfig, SpeedometerConfig,
    Thresholds, TorusGaugeConfig, WindowConfig,
};
pub use dashboard::{Dashboard, DashboardCommand, GaugeSlot};
pub use error::{CatalogError, GaugeError};
pub use gauge::Gauge;
pub use scene::{DrawCommand, Scene};
pub use scheduler::{FrameHandle, Scheduler, SchedulerStats, TimerHandle};
pub use source::{DemoGenerator, ValueSource};
pub use widgets::{ArcGauge, Band, BarGauge, ColumnGauge, RatingWidget, Speedometer, TorusGauge};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_round_trip_through_display() {
        let color = Color::hex(0x42a5f5);
        assert_eq!(color.as_tuple(), (0x42, 0xa5, 0xf5));
        assert_eq!(color.to_string(), "#42a5f5");
        assert_eq!(Color::WHITE.to_string(), "#ffffff");
    }
}
