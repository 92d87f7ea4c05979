//! Pure geometry helpers shared by every gauge variant.
//!
//! Angles are in degrees, measured clockwise from 12 o'clock, in screen space
//! (y grows downwards). None of these functions fail: non-positive radii,
//! lengths or totals collapse to zero-length primitives.

use std::fmt;

/// Where each variant's zero sits, as an SVG-style rotation away from the
/// 3 o'clock origin that circle strokes start at.
pub mod zero_reference {
    /// Torus rings start at 12 o'clock.
    pub const TORUS_DEG: f64 = -90.0;
    /// Arc gauges start at 9 o'clock and sweep over the top.
    pub const ARC_DEG: f64 = -180.0;
    /// Bars and columns are axis aligned and never rotated.
    pub const AXIS_ALIGNED_DEG: f64 = 0.0;

    /// Convert an SVG rotation into this module's clock convention.
    pub fn to_clock(svg_deg: f64) -> f64 {
        svg_deg + 90.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis aligned rectangle in drawing units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Point on a circle of `radius` around `center` at `angle_deg`.
pub fn polar(center: Point, radius: f64, angle_deg: f64) -> Point {
    let radius = radius.max(0.0);
    let rad = (angle_deg - 90.0).to_radians();
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

/// A circular arc, drawn clockwise from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    pub center: Point,
    pub radius: f64,
    pub start_deg: f64,
    pub end_deg: f64,
    pub start: Point,
    pub end: Point,
    pub large_arc: bool,
}

impl ArcPath {
    pub fn sweep_deg(&self) -> f64 {
        self.end_deg - self.start_deg
    }

    pub fn is_degenerate(&self) -> bool {
        self.radius <= 0.0 || self.sweep_deg() <= 0.0
    }
}

impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} A {} {} 0 {} 1 {} {}",
            self.start.x,
            self.start.y,
            self.radius,
            self.radius,
            u8::from(self.large_arc),
            self.end.x,
            self.end.y
        )
    }
}

pub fn arc_path(start_deg: f64, end_deg: f64, radius: f64, center: Point) -> ArcPath {
    if radius <= 0.0 || end_deg <= start_deg {
        return ArcPath {
            center,
            radius: radius.max(0.0),
            start_deg,
            end_deg: start_deg,
            start: center,
            end: center,
            large_arc: false,
        };
    }
    ArcPath {
        center,
        radius,
        start_deg,
        end_deg,
        start: polar(center, radius, start_deg),
        end: polar(center, radius, end_deg),
        large_arc: end_deg - start_deg > 180.0,
    }
}

/// Stroke dash offset that reveals `pct` percent of a ring.
pub fn dash_offset_for_percent(pct: f64, circumference: f64) -> f64 {
    if circumference <= 0.0 {
        return 0.0;
    }
    let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) };
    circumference * (1.0 - pct / 100.0)
}

/// Lengths of the two fill segments of a bar or column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillExtent {
    /// Filled length up to the target.
    pub normal: f64,
    /// Filled length beyond the target, zero unless the value exceeds it.
    pub over: f64,
    /// Position of the target marker along the track.
    pub target: f64,
}

impl FillExtent {
    pub fn filled(&self) -> f64 {
        self.normal + self.over
    }

    pub fn is_over(&self) -> bool {
        self.over > 0.0
    }
}

pub fn fill_extent_for_value(value: f64, target: f64, total: f64, track_length: f64) -> FillExtent {
    if total.is_nan() || track_length.is_nan() || total <= 0.0 || track_length <= 0.0 {
        return FillExtent::default();
    }
    // NaN reads as zero, the bottom of the track.
    let length_of = |v: f64| {
        if v.is_nan() {
            0.0
        } else {
            (v / total).clamp(0.0, 1.0) * track_length
        }
    };
    let filled = length_of(value);
    let target_len = length_of(target);

    if value <= target || filled <= target_len {
        FillExtent {
            normal: filled,
            over: 0.0,
            target: target_len,
        }
    } else {
        FillExtent {
            normal: target_len,
            over: filled - target_len,
            target: target_len,
        }
    }
}

pub fn needle_angle(value: f64, min: f64, max: f64, arc_start: f64, arc_sweep: f64) -> f64 {
    if max <= min || value.is_nan() {
        return arc_start;
    }
    let norm = (value.clamp(min, max) - min) / (max - min);
    arc_start + norm * arc_sweep
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub angle: f64,
    pub inner: Point,
    pub outer: Point,
    pub label_value: i64,
}

/// Evenly spaced ticks from `arc_start` through `arc_start + arc_sweep`.
pub fn tick_positions(
    count: usize,
    arc_start: f64,
    arc_sweep: f64,
    center: Point,
    inner_radius: f64,
    outer_radius: f64,
    range: (f64, f64),
) -> Vec<Tick> {
    let (min, max) = range;
    (0..count)
        .map(|i| {
            let t = if count > 1 {
                i as f64 / (count as f64 - 1.0)
            } else {
                0.0
            };
            let angle = arc_start + t * arc_sweep;
            Tick {
                angle,
                inner: polar(center, inner_radius, angle),
                outer: polar(center, outer_radius, angle),
                label_value: (min + t * (max - min)).round() as i64,
            }
        })
        .collect()
}
