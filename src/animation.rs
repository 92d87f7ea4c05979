//! Value animation: eased tweens for fills and a damped spring for needles.
//!
//! Both interpolators are sampled with the scheduler's clock. A new target
//! always supersedes the one in flight and starts from the value currently
//! displayed, so rapid updates never stack.

use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No target has been set yet.
    Idle,
    Animating,
    /// The displayed value sits exactly on the target.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// CSS `ease-in-out`, cubic Bézier (0.42, 0, 0.58, 1).
    EaseInOut,
    CubicBezier(f64, f64, f64, f64),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::EaseInOut
    }
}

impl Easing {
    /// Map linear progress in [0, 1] onto eased progress. Endpoints are exact.
    pub fn apply(self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

fn bezier_coord(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    // Newton first, bisection if the slope flattens out.
    let mut s = x;
    for _ in 0..8 {
        let err = bezier_coord(x1, x2, s) - x;
        if err.abs() < 1e-7 {
            return bezier_coord(y1, y2, s);
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..50 {
        let value = bezier_coord(x1, x2, s);
        if (value - x).abs() < 1e-7 {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier_coord(y1, y2, s)
}

/// Fixed-duration eased interpolation.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    to: f64,
    current: f64,
    started_at: Duration,
    duration: Duration,
    easing: Easing,
    phase: Phase,
}

impl Tween {
    pub fn new(initial: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from: initial,
            to: initial,
            current: initial,
            started_at: Duration::ZERO,
            duration,
            easing,
            phase: Phase::Idle,
        }
    }

    pub fn retarget(&mut self, target: f64, now: Duration) {
        if target == self.to && self.phase != Phase::Idle {
            return;
        }
        debug!(from = self.current, to = target, "tween retargeted");
        self.from = self.current;
        self.to = target;
        self.started_at = now;
        if self.duration.is_zero() {
            self.current = target;
            self.phase = Phase::Settled;
        } else {
            self.phase = Phase::Animating;
        }
    }

    pub fn sample(&mut self, now: Duration) -> f64 {
        if self.phase != Phase::Animating {
            return self.current;
        }
        let elapsed = now.saturating_sub(self.started_at).as_secs_f64();
        let progress = elapsed / self.duration.as_secs_f64();
        if progress >= 1.0 {
            self.current = self.to;
            self.phase = Phase::Settled;
        } else {
            self.current = self.from + (self.to - self.from) * self.easing.apply(progress);
        }
        self.current
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Spring constants. Defaults give a needle that overshoots slightly and
/// settles in about a second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    pub rest_delta: f64,
    pub rest_speed: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 120.0,
            damping: 14.0,
            mass: 0.7,
            rest_delta: 0.01,
            rest_speed: 0.1,
        }
    }
}

const SPRING_STEP_SECS: f64 = 1.0 / 240.0;

/// Damped spring with no fixed duration.
#[derive(Debug, Clone)]
pub struct Spring {
    params: SpringParams,
    position: f64,
    velocity: f64,
    target: f64,
    last_sample: Duration,
    phase: Phase,
}

impl Spring {
    pub fn new(initial: f64, params: SpringParams) -> Self {
        Self {
            params,
            position: initial,
            velocity: 0.0,
            target: initial,
            last_sample: Duration::ZERO,
            phase: Phase::Idle,
        }
    }

    /// Velocity carries over so a retarget mid-flight bends the motion
    /// instead of restarting it.
    pub fn retarget(&mut self, target: f64, now: Duration) {
        if target == self.target && self.phase != Phase::Idle {
            return;
        }
        debug!(from = self.position, to = target, "spring retargeted");
        if self.phase != Phase::Animating {
            self.last_sample = now;
        }
        self.target = target;
        self.phase = Phase::Animating;
    }

    pub fn sample(&mut self, now: Duration) -> f64 {
        if self.phase != Phase::Animating {
            return self.position;
        }
        let mut remaining = now.saturating_sub(self.last_sample).as_secs_f64();
        self.last_sample = now;

        let SpringParams {
            stiffness,
            damping,
            mass,
            rest_delta,
            rest_speed,
        } = self.params;
        let mass = if mass > 0.0 { mass } else { 1.0 };

        while remaining > 0.0 {
            let h = remaining.min(SPRING_STEP_SECS);
            let accel = (-stiffness * (self.position - self.target) - damping * self.velocity) / mass;
            self.velocity += accel * h;
            self.position += self.velocity * h;
            remaining -= h;

            if (self.position - self.target).abs() < rest_delta && self.velocity.abs() < rest_speed {
                self.position = self.target;
                self.velocity = 0.0;
                self.phase = Phase::Settled;
                break;
            }
        }
        self.position
    }

    pub fn value(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// The interpolation policy a gauge animates its displayed value with.
#[derive(Debug, Clone)]
pub enum Motion {
    Tween(Tween),
    Spring(Spring),
}

impl Motion {
    pub fn eased(initial: f64, duration_secs: f64) -> Self {
        // NaN and out-of-range seconds fall back to the nearest representable span.
        let duration =
            Duration::try_from_secs_f64(duration_secs.max(0.0)).unwrap_or(Duration::MAX);
        Motion::Tween(Tween::new(initial, duration, Easing::EaseInOut))
    }

    pub fn spring(initial: f64, params: SpringParams) -> Self {
        Motion::Spring(Spring::new(initial, params))
    }

    pub fn retarget(&mut self, target: f64, now: Duration) {
        match self {
            Motion::Tween(tween) => tween.retarget(target, now),
            Motion::Spring(spring) => spring.retarget(target, now),
        }
    }

    pub fn sample(&mut self, now: Duration) -> f64 {
        match self {
            Motion::Tween(tween) => tween.sample(now),
            Motion::Spring(spring) => spring.sample(now),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Motion::Tween(tween) => tween.value(),
            Motion::Spring(spring) => spring.value(),
        }
    }

    pub fn target(&self) -> f64 {
        match self {
            Motion::Tween(tween) => tween.target(),
            Motion::Spring(spring) => spring.target(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Motion::Tween(tween) => tween.phase(),
            Motion::Spring(spring) => spring.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn easing_endpoints_are_exact() {
        for easing in [Easing::Linear, Easing::EaseInOut, Easing::CubicBezier(0.25, 0.1, 0.25, 1.0)] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn ease_in_out_is_symmetric_and_monotonic() {
        let mid = Easing::EaseInOut.apply(0.5);
        assert!((mid - 0.5).abs() < 1e-4);
        let quarter = Easing::EaseInOut.apply(0.25);
        assert!(quarter < 0.25, "slow start expected, got {quarter}");

        let mut previous = 0.0;
        for i in 1..=100 {
            let eased = Easing::EaseInOut.apply(i as f64 / 100.0);
            assert!(eased >= previous);
            previous = eased;
        }
    }

    #[test]
    fn tween_converges_after_duration() {
        let mut tween = Tween::new(0.0, Duration::from_secs(1), Easing::EaseInOut);
        assert_eq!(tween.phase(), Phase::Idle);
        tween.retarget(80.0, ms(0));
        assert_eq!(tween.phase(), Phase::Animating);

        let halfway = tween.sample(ms(500));
        assert!(halfway > 0.0 && halfway < 80.0);
        assert_eq!(tween.sample(ms(1000)), 80.0);
        assert_eq!(tween.phase(), Phase::Settled);
        assert_eq!(tween.sample(ms(5000)), 80.0);
    }

    #[test]
    fn tween_approaches_target_monotonically() {
        let mut tween = Tween::new(10.0, Duration::from_secs(2), Easing::EaseInOut);
        tween.retarget(90.0, ms(0));
        let mut previous = 10.0;
        for step in 1..=120 {
            let value = tween.sample(ms(step * 1000 / 60));
            assert!(value >= previous && value <= 90.0);
            previous = value;
        }
        assert_eq!(previous, 90.0);
    }

    #[test]
    fn retarget_mid_flight_starts_from_displayed_value() {
        let mut tween = Tween::new(0.0, Duration::from_secs(1), Easing::Linear);
        tween.retarget(100.0, ms(0));
        let at_half = tween.sample(ms(500));
        assert!((at_half - 50.0).abs() < 1e-9);

        tween.retarget(20.0, ms(500));
        assert!((tween.sample(ms(500)) - 50.0).abs() < 1e-9);
        assert!((tween.sample(ms(1000)) - 35.0).abs() < 1e-9);
        assert_eq!(tween.sample(ms(1500)), 20.0);
    }

    #[test]
    fn rapid_retargets_keep_only_the_latest() {
        let mut tween = Tween::new(0.0, Duration::from_secs(1), Easing::EaseInOut);
        for (i, target) in [10.0, 70.0, 30.0, 55.0].into_iter().enumerate() {
            tween.retarget(target, ms(i as u64 * 10));
        }
        assert_eq!(tween.target(), 55.0);
        assert_eq!(tween.sample(ms(1030)), 55.0);
    }

    #[test]
    fn zero_duration_jumps() {
        let mut tween = Tween::new(0.0, Duration::ZERO, Easing::EaseInOut);
        tween.retarget(42.0, ms(3));
        assert_eq!(tween.phase(), Phase::Settled);
        assert_eq!(tween.sample(ms(3)), 42.0);
    }

    #[test]
    fn spring_overshoots_then_settles_exactly() {
        let mut spring = Spring::new(-110.0, SpringParams::default());
        spring.retarget(110.0, ms(0));

        let mut peak = f64::MIN;
        let mut now = 0;
        while spring.phase() == Phase::Animating && now < 10_000 {
            now += 16;
            peak = peak.max(spring.sample(ms(now)));
        }
        assert_eq!(spring.phase(), Phase::Settled);
        assert_eq!(spring.value(), 110.0);
        assert!(peak > 110.0, "underdamped needle should overshoot");
    }

    #[test]
    fn spring_retarget_keeps_velocity() {
        let mut spring = Spring::new(0.0, SpringParams::default());
        spring.retarget(100.0, ms(0));
        spring.sample(ms(100));
        let velocity = spring.velocity();
        assert!(velocity > 0.0);
        spring.retarget(0.0, ms(100));
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn motion_delegates() {
        let mut motion = Motion::eased(0.0, 1.0);
        motion.retarget(5.0, ms(0));
        assert_eq!(motion.target(), 5.0);
        assert_eq!(motion.sample(ms(2000)), 5.0);
        assert_eq!(motion.phase(), Phase::Settled);
    }

    #[test]
    fn unrepresentable_durations_do_not_panic() {
        let mut motion = Motion::eased(0.0, 1e30);
        motion.retarget(50.0, ms(0));
        let value = motion.sample(ms(1000));
        assert!((0.0..50.0).contains(&value));
        assert_eq!(motion.phase(), Phase::Animating);

        let mut motion = Motion::eased(0.0, f64::NAN);
        motion.retarget(50.0, ms(0));
        assert_eq!(motion.sample(ms(0)), 50.0);
    }
}
