//! Per-instance wiring of value source, animation and scheduler.
//!
//! A `GaugeDriver` owns exactly one frame subscription and, while demo mode is
//! on, exactly one demo timer. Both are released by `teardown`, which also
//! runs on drop.

use crate::animation::{Motion, Phase};
use crate::scene::Scene;
use crate::scheduler::{FrameHandle, Scheduler, TimerHandle};
use crate::source::{clamp_reading, DemoGenerator, ValueSource};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::debug;

/// Maps a reading onto the quantity that is animated (a percentage, a fill
/// fraction, a needle angle).
pub type Projection = Box<dyn Fn(f64) -> f64>;

/// Behaviour shared by every gauge variant.
pub trait Gauge {
    fn set_value(&mut self, value: f64);
    fn set_demo_mode(&mut self, enabled: bool);
    /// The clamped reading the gauge is heading towards.
    fn reading(&self) -> f64;
    /// The animated quantity currently on screen.
    fn displayed_value(&self) -> f64;
    fn size(&self) -> (f64, f64);
    fn scene(&self) -> Scene;
    fn teardown(&mut self);
}

pub struct DriverOptions {
    pub range: (f64, f64),
    pub value: f64,
    pub demo_mode: bool,
    pub demo_interval: (Duration, Duration),
    pub demo_seed: Option<u64>,
    pub motion: Motion,
    pub projection: Projection,
}

struct DriverState {
    source: ValueSource,
    external: f64,
    range: (f64, f64),
    motion: Motion,
    projection: Projection,
    displayed: f64,
}

impl DriverState {
    fn reading(&self) -> f64 {
        self.source.reading(self.range)
    }

    fn retarget(&mut self, now: Duration) {
        let target = (self.projection)(self.reading());
        self.motion.retarget(target, now);
    }
}

pub struct GaugeDriver {
    scheduler: Scheduler,
    state: Rc<RefCell<DriverState>>,
    demo_interval: (Duration, Duration),
    demo_seed: Option<u64>,
    demo_timer: Option<TimerHandle>,
    frames: Option<FrameHandle>,
}

impl GaugeDriver {
    pub fn new(scheduler: &Scheduler, options: DriverOptions) -> Self {
        let DriverOptions {
            range,
            value,
            demo_mode,
            demo_interval,
            demo_seed,
            motion,
            projection,
        } = options;

        let displayed = motion.value();
        let state = Rc::new(RefCell::new(DriverState {
            source: ValueSource::External(value),
            external: value,
            range,
            motion,
            projection,
            displayed,
        }));

        let weak = Rc::downgrade(&state);
        let frames = scheduler.on_frame(move |now| {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                state.displayed = state.motion.sample(now);
            }
        });

        let mut driver = Self {
            scheduler: scheduler.clone(),
            state,
            demo_interval,
            demo_seed,
            demo_timer: None,
            frames: Some(frames),
        };
        if demo_mode {
            driver.start_demo();
        } else {
            driver.state.borrow_mut().retarget(driver.scheduler.now());
        }
        driver
    }

    pub fn set_value(&mut self, value: f64) {
        let now = self.scheduler.now();
        let mut state = self.state.borrow_mut();
        state.external = value;
        if !state.source.is_demo() {
            state.source = ValueSource::External(value);
            state.retarget(now);
        }
    }

    pub fn set_demo_mode(&mut self, enabled: bool) {
        if self.is_torn_down() {
            return;
        }
        match (enabled, self.is_demo()) {
            (true, false) => self.start_demo(),
            (false, true) => self.stop_demo(),
            _ => {}
        }
    }

    pub fn is_demo(&self) -> bool {
        self.state.borrow().source.is_demo()
    }

    fn start_demo(&mut self) {
        let now = self.scheduler.now();
        let mut generator = {
            let state = self.state.borrow();
            DemoGenerator::new(state.range, self.demo_interval, self.demo_seed)
        };
        let first_delay = generator.next_interval();
        debug!(value = generator.current(), ?first_delay, "demo mode started");
        {
            let mut state = self.state.borrow_mut();
            state.source = ValueSource::Demo(generator);
            state.retarget(now);
        }

        let weak: Weak<RefCell<DriverState>> = Rc::downgrade(&self.state);
        self.demo_timer = Some(self.scheduler.set_timer(first_delay, move |now| {
            let state = weak.upgrade()?;
            let mut state = state.borrow_mut();
            let ValueSource::Demo(generator) = &mut state.source else {
                return None;
            };
            let value = generator.next_value();
            let delay = generator.next_interval();
            debug!(value, ?delay, "demo value drawn");
            state.retarget(now);
            Some(delay)
        }));
    }

    fn stop_demo(&mut self) {
        if let Some(mut timer) = self.demo_timer.take() {
            timer.cancel();
        }
        let now = self.scheduler.now();
        let mut state = self.state.borrow_mut();
        state.source = ValueSource::External(state.external);
        state.retarget(now);
        debug!("demo mode stopped");
    }

    /// Release the demo timer and the frame subscription. Safe to call twice.
    pub fn teardown(&mut self) {
        if let Some(mut timer) = self.demo_timer.take() {
            timer.cancel();
        }
        if let Some(mut frames) = self.frames.take() {
            frames.cancel();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.frames.is_none()
    }

    pub fn reading(&self) -> f64 {
        self.state.borrow().reading()
    }

    pub fn range(&self) -> (f64, f64) {
        self.state.borrow().range
    }

    pub fn displayed(&self) -> f64 {
        self.state.borrow().displayed
    }

    pub fn target(&self) -> f64 {
        self.state.borrow().motion.target()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().motion.phase()
    }

    pub fn clamp(&self, value: f64) -> f64 {
        clamp_reading(value, self.range())
    }
}

impl Drop for GaugeDriver {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SpringParams;

    fn options(value: f64, demo_mode: bool) -> DriverOptions {
        DriverOptions {
            range: (0.0, 100.0),
            value,
            demo_mode,
            demo_interval: (Duration::from_secs(1), Duration::from_secs(10)),
            demo_seed: Some(11),
            motion: Motion::eased(0.0, 1.0),
            projection: Box::new(|v| v),
        }
    }

    fn run(scheduler: &Scheduler, millis: u64) {
        for _ in 0..millis / 16 {
            scheduler.advance(Duration::from_millis(16));
        }
    }

    #[test]
    fn displayed_value_converges_to_clamped_reading() {
        let scheduler = Scheduler::new();
        let driver = GaugeDriver::new(&scheduler, options(140.0, false));
        assert_eq!(driver.reading(), 100.0);
        assert_eq!(driver.displayed(), 0.0);
        run(&scheduler, 1100);
        assert_eq!(driver.displayed(), 100.0);
        assert_eq!(driver.phase(), Phase::Settled);
    }

    #[test]
    fn new_value_supersedes_animation_in_flight() {
        let scheduler = Scheduler::new();
        let mut driver = GaugeDriver::new(&scheduler, options(80.0, false));
        run(&scheduler, 400);
        let midway = driver.displayed();
        assert!(midway > 0.0 && midway < 80.0);

        driver.set_value(10.0);
        driver.set_value(30.0);
        assert_eq!(driver.target(), 30.0);
        run(&scheduler, 1100);
        assert_eq!(driver.displayed(), 30.0);
    }

    #[test]
    fn projection_feeds_the_spring() {
        let scheduler = Scheduler::new();
        let driver = GaugeDriver::new(
            &scheduler,
            DriverOptions {
                range: (0.0, 10.0),
                value: 12.0,
                demo_mode: false,
                demo_interval: (Duration::from_secs(1), Duration::from_secs(2)),
                demo_seed: None,
                motion: Motion::spring(-110.0, SpringParams::default()),
                projection: Box::new(|v| -110.0 + v / 10.0 * 220.0),
            },
        );
        assert_eq!(driver.target(), 110.0);
        run(&scheduler, 5000);
        assert_eq!(driver.displayed(), 110.0);
    }

    #[test]
    fn demo_mode_retargets_on_every_firing() {
        let scheduler = Scheduler::new();
        let driver = GaugeDriver::new(&scheduler, options(0.0, true));
        assert!(driver.is_demo());

        for _ in 0..120 {
            scheduler.advance(Duration::from_millis(500));
            let reading = driver.reading();
            assert!((0.0..=100.0).contains(&reading));
            assert_eq!(reading.fract(), 0.0);
        }
        assert!(scheduler.stats().timer_fires >= 6);
        assert_eq!(scheduler.stats().active_timers, 1);
    }

    #[test]
    fn disabling_demo_mode_cancels_its_timer() {
        let scheduler = Scheduler::new();
        let mut driver = GaugeDriver::new(&scheduler, options(42.0, true));
        assert_eq!(scheduler.stats().active_timers, 1);

        driver.set_demo_mode(false);
        assert_eq!(scheduler.stats().active_timers, 0);
        assert_eq!(driver.reading(), 42.0);

        let fires = scheduler.stats().timer_fires;
        scheduler.advance(Duration::from_secs(120));
        assert_eq!(scheduler.stats().timer_fires, fires);

        driver.set_demo_mode(true);
        driver.set_demo_mode(true);
        assert_eq!(scheduler.stats().active_timers, 1);
    }

    #[test]
    fn external_values_are_remembered_during_demo() {
        let scheduler = Scheduler::new();
        let mut driver = GaugeDriver::new(&scheduler, options(5.0, true));
        driver.set_value(64.0);
        driver.set_demo_mode(false);
        assert_eq!(driver.reading(), 64.0);
    }

    #[test]
    fn teardown_releases_everything_once() {
        let scheduler = Scheduler::new();
        let mut driver = GaugeDriver::new(&scheduler, options(0.0, true));
        scheduler.advance(Duration::from_secs(40));
        let before = scheduler.stats();
        assert!(before.timer_fires > 0 && before.frame_calls > 0);

        driver.teardown();
        driver.teardown();
        assert!(driver.is_torn_down());
        drop(driver);

        scheduler.advance(Duration::from_secs(120));
        let after = scheduler.stats();
        assert_eq!(after.timer_fires, before.timer_fires);
        assert_eq!(after.frame_calls, before.frame_calls);
        assert_eq!((after.active_timers, after.active_frames), (0, 0));
        assert_eq!((after.released_timers, after.released_frames), (1, 1));
    }
}
