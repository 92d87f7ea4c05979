// ============================================================================
// DASHBOARD
// ============================================================================
//
// Composes the five gauges and the rating input into one scene and drives
// them from a window loop or from explicit `advance` calls.

use crate::catalog::DashboardStats;
use crate::config::{
    ArcGaugeConfig, BarGaugeConfig, ColumnGaugeConfig, LayoutConfig, SpeedometerConfig,
    TorusGaugeConfig, WindowConfig,
};
use crate::error::GaugeError;
use crate::gauge::Gauge;
use crate::geometry::Point;
use crate::raster::{render_scene, Canvas};
use crate::scene::{Anchor, DrawCommand, Scene};
use crate::scheduler::Scheduler;
use crate::widgets::{ArcGauge, BarGauge, ColumnGauge, RatingWidget, Speedometer, TorusGauge};
use crate::Color;
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use std::cell::Cell;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

const HEADER_HEIGHT: f64 = 40.0;
const HEADER_TEXT: Color = Color::hex(0x1f2937);

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeSlot {
    Arc,
    Bar,
    Column,
    Torus,
    Speedometer,
}

impl FromStr for GaugeSlot {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arc" => Ok(GaugeSlot::Arc),
            "bar" => Ok(GaugeSlot::Bar),
            "column" => Ok(GaugeSlot::Column),
            "torus" => Ok(GaugeSlot::Torus),
            "speedometer" => Ok(GaugeSlot::Speedometer),
            other => Err(GaugeError::Command(format!("unknown gauge {other:?}"))),
        }
    }
}

/// Updates fed to a running dashboard, e.g. parsed from stdin lines such as
/// `torus 42`, `demo off` or `rate 7`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashboardCommand {
    SetValue(GaugeSlot, f64),
    SetDemoMode(bool),
    Rate(u8),
}

impl FromStr for DashboardCommand {
    type Err = GaugeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let (Some(head), Some(arg), None) = (words.next(), words.next(), words.next()) else {
            return Err(GaugeError::Command(line.trim().to_string()));
        };
        let bad = || GaugeError::Command(line.trim().to_string());
        match head {
            "demo" => match arg {
                "on" => Ok(DashboardCommand::SetDemoMode(true)),
                "off" => Ok(DashboardCommand::SetDemoMode(false)),
                _ => Err(bad()),
            },
            "rate" => arg.parse().map(DashboardCommand::Rate).map_err(|_| bad()),
            slot => {
                let slot = slot.parse()?;
                let value = arg.parse().map_err(|_| bad())?;
                Ok(DashboardCommand::SetValue(slot, value))
            }
        }
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

pub struct Dashboard {
    scheduler: Scheduler,
    window: WindowConfig,
    layout: LayoutConfig,
    gauges: Vec<(GaugeSlot, Box<dyn Gauge>)>,
    rating: RatingWidget,
    picked: Rc<Cell<Option<u8>>>,
    stats: DashboardStats,
    font: Option<Font<'static>>,
}

impl Dashboard {
    /// Gauges seeded from catalog statistics: watched share on the arc,
    /// unwatched share on the torus, counts on the bar and column, the mean
    /// rating on the speedometer.
    pub fn new(
        scheduler: &Scheduler,
        stats: DashboardStats,
        average_rating: Option<f64>,
        demo_mode: bool,
    ) -> Result<Self, GaugeError> {
        let total = stats.total.max(1) as f64;
        let watched_pct = stats.watched_percent();
        let unwatched_pct = if stats.total == 0 { 0.0 } else { 100.0 - watched_pct };
        let rating = average_rating.unwrap_or(0.0);

        let mut gauges: Vec<(GaugeSlot, Box<dyn Gauge>)> = Vec::new();
        gauges.push((
            GaugeSlot::Arc,
            Box::new(ArcGauge::new(
                ArcGaugeConfig::builder().value(watched_pct).demo_mode(demo_mode).build(),
                scheduler,
            )?),
        ));
        gauges.push((
            GaugeSlot::Torus,
            Box::new(TorusGauge::new(
                TorusGaugeConfig::builder().value(unwatched_pct).demo_mode(demo_mode).build(),
                scheduler,
            )?),
        ));
        gauges.push((
            GaugeSlot::Speedometer,
            Box::new(Speedometer::new(
                SpeedometerConfig::builder()
                    .value(rating)
                    .caption("avg rating")
                    .demo_mode(demo_mode)
                    .build(),
                scheduler,
            )?),
        ));
        gauges.push((
            GaugeSlot::Bar,
            Box::new(BarGauge::new(
                BarGaugeConfig::builder()
                    .value(stats.watched as f64)
                    .target(total / 2.0)
                    .total(total)
                    .demo_mode(demo_mode)
                    .build(),
                scheduler,
            )?),
        ));
        gauges.push((
            GaugeSlot::Column,
            Box::new(ColumnGauge::new(
                ColumnGaugeConfig::builder()
                    .value(stats.unwatched as f64)
                    .target(total / 2.0)
                    .total(total)
                    .demo_mode(demo_mode)
                    .build(),
                scheduler,
            )?),
        ));

        let picked = Rc::new(Cell::new(None));
        let sink = picked.clone();
        let rating_widget =
            RatingWidget::new(rating.round() as u8).on_change(move |star| sink.set(Some(star)));

        info!(
            total = stats.total,
            watched = stats.watched,
            demo_mode,
            "dashboard created"
        );
        Ok(Self {
            scheduler: scheduler.clone(),
            window: WindowConfig::default(),
            layout: LayoutConfig::default(),
            gauges,
            rating: rating_widget,
            picked,
            stats,
            font: None,
        })
    }

    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_font(mut self, font: Option<Font<'static>>) -> Self {
        self.font = font;
        self
    }

    pub fn gauge(&self, slot: GaugeSlot) -> Option<&dyn Gauge> {
        self.gauges
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, gauge)| &**gauge)
    }

    fn gauge_mut(&mut self, slot: GaugeSlot) -> Option<&mut Box<dyn Gauge>> {
        self.gauges.iter_mut().find(|(s, _)| *s == slot).map(|(_, gauge)| gauge)
    }

    pub fn rating(&self) -> &RatingWidget {
        &self.rating
    }

    pub fn apply(&mut self, command: DashboardCommand) {
        debug!(?command, "dashboard command");
        match command {
            DashboardCommand::SetValue(slot, value) => {
                if let Some(gauge) = self.gauge_mut(slot) {
                    gauge.set_value(value);
                }
            }
            DashboardCommand::SetDemoMode(enabled) => {
                for (_, gauge) in &mut self.gauges {
                    gauge.set_demo_mode(enabled);
                }
            }
            DashboardCommand::Rate(star) => {
                self.rating.click(star);
            }
        }
        self.sync_rating();
    }

    /// A star picked on the rating input becomes the rating and moves the
    /// speedometer.
    fn sync_rating(&mut self) {
        if let Some(star) = self.picked.take() {
            self.rating.set_rating(star);
            if let Some(gauge) = self.gauge_mut(GaugeSlot::Speedometer) {
                gauge.set_value(f64::from(star));
            }
        }
    }

    /// Step the shared clock by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.scheduler.advance(dt);
        self.sync_rating();
    }

    /// Forward a click in dashboard coordinates to the rating input.
    pub fn click(&mut self, at: Point) -> bool {
        let origin = self.rating_origin();
        let (width, height) = self.rating.size();
        if at.y < origin.y || at.y > origin.y + height || at.x > origin.x + width {
            return false;
        }
        let Some(star) = self.rating.star_at(at.x - origin.x) else {
            return false;
        };
        let emitted = self.rating.click(star);
        self.sync_rating();
        emitted
    }

    fn row_origins(&self) -> (f64, f64) {
        let first = self.layout.margin + HEADER_HEIGHT;
        (first, first + self.layout.row_height)
    }

    fn rating_origin(&self) -> Point {
        let (_, second) = self.row_origins();
        let bar_height = self.gauge(GaugeSlot::Bar).map_or(0.0, |g| g.size().1);
        Point::new(self.layout.margin, second + bar_height + self.layout.gap / 2.0)
    }

    /// Top-left corner of each gauge.
    fn placements(&self) -> Vec<(GaugeSlot, Point)> {
        let LayoutConfig { margin, gap, .. } = self.layout;
        let (first, second) = self.row_origins();
        let mut placements = Vec::new();

        let mut x = margin;
        for slot in [GaugeSlot::Arc, GaugeSlot::Torus, GaugeSlot::Speedometer] {
            if let Some(gauge) = self.gauge(slot) {
                placements.push((slot, Point::new(x, first)));
                x += gauge.size().0 + gap;
            }
        }

        let bar_width = self.gauge(GaugeSlot::Bar).map_or(0.0, |g| g.size().0);
        let left_column = bar_width.max(self.rating.size().0);
        placements.push((GaugeSlot::Bar, Point::new(margin, second)));
        placements.push((GaugeSlot::Column, Point::new(margin + left_column + gap, second)));
        placements
    }

    pub fn scene(&self) -> Scene {
        let width = self.window.width as f64;
        let height = self.window.height as f64;
        let margin = self.layout.margin;
        let mut scene = Scene::new(width, height);
        scene.add_command(DrawCommand::Clear(self.window.background));
        scene.add_command(DrawCommand::Text {
            at: Point::new(margin, margin + HEADER_HEIGHT / 2.0),
            text: self.window.title.clone(),
            size: 24.0,
            anchor: Anchor::Start,
            bold: true,
            color: HEADER_TEXT,
        });

        for (slot, origin) in self.placements() {
            if let Some(gauge) = self.gauge(slot) {
                scene.place(&gauge.scene(), origin.x, origin.y);
            }
        }

        let rating_origin = self.rating_origin();
        scene.place(&self.rating.scene(), rating_origin.x, rating_origin.y);

        let stats_y = rating_origin.y + self.rating.size().1 + self.layout.gap / 2.0;
        let lines = [
            format!("Watched: {} / {}", self.stats.watched, self.stats.total),
            format!("Unwatched: {} / {}", self.stats.unwatched, self.stats.total),
        ];
        for (i, line) in lines.into_iter().enumerate() {
            scene.add_command(DrawCommand::Text {
                at: Point::new(margin, stats_y + i as f64 * 20.0),
                text: line,
                size: 16.0,
                anchor: Anchor::Start,
                bold: false,
                color: HEADER_TEXT,
            });
        }
        scene
    }

    /// Rasterize the current scene into an RGBA buffer of `width * height`.
    pub fn render_frame(&self, frame: &mut [u8], width: usize, height: usize) {
        let mut canvas = Canvas::new(frame, width, height);
        render_scene(&mut canvas, &self.scene(), self.font.as_ref());
    }

    pub fn teardown(&mut self) {
        for (_, gauge) in &mut self.gauges {
            gauge.teardown();
        }
    }

    // ========================================================================
    // WINDOW LOOP
    // ========================================================================

    pub fn show(self) -> Result<(), GaugeError> {
        self.run_window(None)
    }

    pub fn show_with_commands(self, receiver: Receiver<DashboardCommand>) -> Result<(), GaugeError> {
        self.run_window(Some(receiver))
    }

    fn run_window(mut self, receiver: Option<Receiver<DashboardCommand>>) -> Result<(), GaugeError> {
        let logical_width = self.window.width;
        let logical_height = self.window.height;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.window.title)
            .with_inner_size(LogicalSize::new(logical_width as f64, logical_height as f64))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        // The buffer stays in logical pixels; pixels scales it onto the surface.
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(logical_width as u32, logical_height as u32, surface_texture)?;

        let frame_duration = Duration::from_secs_f64(1.0 / self.window.max_framerate.max(1.0));
        let mut last_frame = Instant::now();
        let mut last_tick = Instant::now();
        let mut cursor = Point::default();
        info!(width = logical_width, height = logical_height, "window opened");

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        self.teardown();
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                            warn!(%err, "surface resize failed");
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let logical = position.to_logical::<f64>(window_clone.scale_factor());
                        cursor = Point::new(logical.x, logical.y);
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        self.click(cursor);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            while let Ok(command) = receiver.try_recv() {
                                self.apply(command);
                            }
                        }
                        let now = Instant::now();
                        self.advance(now.duration_since(last_tick));
                        last_tick = now;

                        self.render_frame(pixels.frame_mut(), logical_width, logical_height);
                        if let Err(err) = pixels.render() {
                            warn!(%err, "render failed, closing window");
                            self.teardown();
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> DashboardStats {
        DashboardStats {
            total: 4,
            watched: 3,
            unwatched: 1,
        }
    }

    fn settle(dashboard: &mut Dashboard) {
        for _ in 0..400 {
            dashboard.advance(Duration::from_millis(16));
        }
    }

    #[test]
    fn gauges_are_seeded_from_catalog_stats() {
        let scheduler = Scheduler::new();
        let mut dashboard = Dashboard::new(&scheduler, stats(), Some(7.0), false).unwrap();
        settle(&mut dashboard);

        let reading = |slot| dashboard.gauge(slot).map(|g| g.reading());
        assert_eq!(reading(GaugeSlot::Arc), Some(75.0));
        assert_eq!(reading(GaugeSlot::Torus), Some(25.0));
        assert_eq!(reading(GaugeSlot::Bar), Some(3.0));
        assert_eq!(reading(GaugeSlot::Column), Some(1.0));
        assert_eq!(reading(GaugeSlot::Speedometer), Some(7.0));
        assert_eq!(dashboard.rating().rating(), 7);

        let scene = dashboard.scene();
        assert!(scene.texts().any(|t| t == "Watched: 3 / 4"));
        assert!(scene.texts().any(|t| t == "75.0%"));
        assert!(scene.texts().any(|t| t == "avg rating"));
    }

    #[test]
    fn commands_parse_from_text() {
        assert_eq!(
            "torus 42".parse::<DashboardCommand>().unwrap(),
            DashboardCommand::SetValue(GaugeSlot::Torus, 42.0)
        );
        assert_eq!(
            "demo off".parse::<DashboardCommand>().unwrap(),
            DashboardCommand::SetDemoMode(false)
        );
        assert_eq!("rate 7".parse::<DashboardCommand>().unwrap(), DashboardCommand::Rate(7));
        assert!("gauge 3".parse::<DashboardCommand>().is_err());
        assert!("arc".parse::<DashboardCommand>().is_err());
        assert!("arc x".parse::<DashboardCommand>().is_err());
        assert!("arc 1 2".parse::<DashboardCommand>().is_err());
    }

    #[test]
    fn commands_drive_gauges() {
        let scheduler = Scheduler::new();
        let mut dashboard = Dashboard::new(&scheduler, stats(), None, false).unwrap();
        dashboard.apply(DashboardCommand::SetValue(GaugeSlot::Speedometer, 42.0));
        assert_eq!(dashboard.gauge(GaugeSlot::Speedometer).map(|g| g.reading()), Some(10.0));

        dashboard.apply(DashboardCommand::SetDemoMode(true));
        assert_eq!(scheduler.stats().active_timers, 5);
        dashboard.apply(DashboardCommand::SetDemoMode(false));
        assert_eq!(scheduler.stats().active_timers, 0);

        dashboard.apply(DashboardCommand::Rate(4));
        assert_eq!(dashboard.rating().rating(), 4);
        assert_eq!(dashboard.gauge(GaugeSlot::Speedometer).map(|g| g.reading()), Some(4.0));
    }

    #[test]
    fn clicking_a_star_rates() {
        let scheduler = Scheduler::new();
        let mut dashboard = Dashboard::new(&scheduler, stats(), None, false).unwrap();
        let origin = dashboard.rating_origin();
        assert!(dashboard.click(Point::new(origin.x + 24.0 * 5.5, origin.y + 10.0)));
        assert_eq!(dashboard.rating().rating(), 6);
        assert!(!dashboard.click(Point::new(1.0, 1.0)));
    }

    #[test]
    fn frame_renders_without_font() {
        let scheduler = Scheduler::new();
        let mut dashboard = Dashboard::new(&scheduler, stats(), Some(5.0), false).unwrap();
        settle(&mut dashboard);
        let (w, h) = (900, 520);
        let mut frame = vec![0u8; w * h * 4];
        dashboard.render_frame(&mut frame, w, h);
        assert!(frame.chunks_exact(4).any(|px| px[..3] != [0xff, 0xff, 0xff]));
        assert!(frame.chunks_exact(4).all(|px| px[3] == 0xff));
    }

    #[test]
    fn dropping_the_dashboard_releases_every_gauge() {
        let scheduler = Scheduler::new();
        let dashboard = Dashboard::new(&scheduler, stats(), None, true).unwrap();
        let active = scheduler.stats();
        assert_eq!((active.active_timers, active.active_frames), (5, 5));
        drop(dashboard);
        let after = scheduler.stats();
        assert_eq!((after.active_timers, after.active_frames), (0, 0));
    }
}
