//! Where a gauge's reading comes from: the caller, or a random demo feed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Clamp `value` into `range`, mapping NaN to the lower bound.
pub fn clamp_reading(value: f64, range: (f64, f64)) -> f64 {
    let (min, max) = range;
    if value.is_nan() {
        return min;
    }
    if max < min {
        return min;
    }
    value.clamp(min, max)
}

/// Random integer readings on irregular intervals.
#[derive(Debug, Clone)]
pub struct DemoGenerator {
    values: (i64, i64),
    interval: (Duration, Duration),
    current: i64,
    rng: StdRng,
}

impl DemoGenerator {
    /// `range` is the gauge's valid range; readings are the integers inside it.
    /// Intervals are drawn from `interval.0` up to, but excluding, `interval.1`.
    pub fn new(range: (f64, f64), interval: (Duration, Duration), seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let low = range.0.ceil() as i64;
        let high = (range.1.floor() as i64).max(low);
        let mut generator = Self {
            values: (low, high),
            interval,
            current: low,
            rng,
        };
        generator.next_value();
        generator
    }

    pub fn next_value(&mut self) -> i64 {
        self.current = self.rng.random_range(self.values.0..=self.values.1);
        self.current
    }

    pub fn next_interval(&mut self) -> Duration {
        let (min, max) = self.interval;
        if max <= min {
            return min;
        }
        let lo = min.as_millis() as u64;
        let hi = max.as_millis() as u64;
        if hi <= lo {
            return min;
        }
        Duration::from_millis(self.rng.random_range(lo..hi))
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn value_range(&self) -> (i64, i64) {
        self.values
    }

    pub fn interval_range(&self) -> (Duration, Duration) {
        self.interval
    }
}

#[derive(Debug, Clone)]
pub enum ValueSource {
    External(f64),
    Demo(DemoGenerator),
}

impl ValueSource {
    /// The reading for this render pass, always inside `range`.
    pub fn reading(&self, range: (f64, f64)) -> f64 {
        match self {
            ValueSource::External(value) => clamp_reading(*value, range),
            ValueSource::Demo(generator) => clamp_reading(generator.current() as f64, range),
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, ValueSource::Demo(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn external_values_are_clamped() {
        assert_eq!(ValueSource::External(12.0).reading((0.0, 10.0)), 10.0);
        assert_eq!(ValueSource::External(-4.0).reading((0.0, 10.0)), 0.0);
        assert_eq!(ValueSource::External(f64::NAN).reading((0.0, 10.0)), 0.0);
        assert_eq!(ValueSource::External(7.5).reading((0.0, 10.0)), 7.5);
    }

    #[test]
    fn seeded_generators_repeat() {
        let interval = (Duration::from_secs(1), Duration::from_secs(10));
        let mut a = DemoGenerator::new((0.0, 100.0), interval, Some(7));
        let mut b = DemoGenerator::new((0.0, 100.0), interval, Some(7));
        for _ in 0..20 {
            assert_eq!(a.next_value(), b.next_value());
            assert_eq!(a.next_interval(), b.next_interval());
        }
    }

    #[test]
    fn fractional_ranges_use_inner_integers() {
        let generator = DemoGenerator::new((0.5, 3.7), (Duration::ZERO, Duration::ZERO), Some(1));
        assert_eq!(generator.value_range(), (1, 3));
        let mut fixed = generator.clone();
        assert_eq!(fixed.next_interval(), Duration::ZERO);
    }

    proptest! {
        #[test]
        fn demo_values_and_intervals_stay_in_bounds(
            seed in any::<u64>(),
            min in -50i64..50,
            span in 0i64..200,
            lo_ms in 1_000u64..5_000,
            extra_ms in 1u64..30_000,
        ) {
            let max = min + span;
            let interval = (Duration::from_millis(lo_ms), Duration::from_millis(lo_ms + extra_ms));
            let mut generator = DemoGenerator::new((min as f64, max as f64), interval, Some(seed));
            prop_assert!((min..=max).contains(&generator.current()));
            for _ in 0..50 {
                let value = generator.next_value();
                prop_assert!((min..=max).contains(&value));
                let delay = generator.next_interval();
                prop_assert!(delay >= interval.0 && delay < interval.1);
            }
        }
    }
}
