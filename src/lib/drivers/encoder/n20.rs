// N20 gear motor quadrature encoder, read through a timer in encoder mode.

use embedded_hal::Qei;

use crate::filtering::sma::SmaFilter;
use crate::hardware::WheelEncoder;

/// Encoder edges per output shaft revolution (7 PPR x4 x 150:1 gearbox).
pub const DEFAULT_COUNTS_PER_REV: f32 = 4200.0;

pub const SPEED_FILTER_SIZE: usize = 8;

pub struct N20<X> {
    encoder: X,
    last_count: u16,
    total_counts: i32,
    counts_per_rev: f32,
    prev_angle: f32,
    speed: SmaFilter<f32, SPEED_FILTER_SIZE>,
}

impl<X> N20<X>
where
    X: Qei<Count = u16>,
{
    pub fn new(qei: X, counts_per_rev: f32) -> Self {
        let last_count = qei.count();
        Self {
            encoder: qei,
            last_count,
            total_counts: 0,
            counts_per_rev,
            prev_angle: 0.0,
            speed: SmaFilter::new(),
        }
    }

    /// Folds the counter movement since the last call into the running
    /// total. Must run faster than the counter can wrap half way.
    pub fn update(&mut self) -> i32 {
        let count = self.encoder.count();
        let delta = count.wrapping_sub(self.last_count) as i16 as i32;
        self.last_count = count;
        self.total_counts += delta;
        self.total_counts
    }

    pub fn get_angle(&self) -> f32 {
        self.total_counts as f32 / self.counts_per_rev * 360.0
    }

    /// Updates the count and returns the averaged wheel speed in degrees
    /// per second. `deltat` is the time since the previous call.
    pub fn get_speed(&mut self, deltat: f32) -> f32 {
        self.update();
        let angle = self.get_angle();
        if deltat > 0.0 {
            self.speed.insert((angle - self.prev_angle) / deltat);
        }
        self.prev_angle = angle;
        self.speed.filtered().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.last_count = self.encoder.count();
        self.total_counts = 0;
        self.prev_angle = 0.0;
        self.speed.reset();
    }
}

impl<X> WheelEncoder for N20<X>
where
    X: Qei<Count = u16>,
{
    fn angle(&mut self) -> f32 {
        self.update();
        self.get_angle()
    }

    fn clear_counts(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::cell::Cell;
    use embedded_hal::Direction as RotaryDirection;

    struct FakeQei<'a> {
        count: &'a Cell<u16>,
    }
    impl Qei for FakeQei<'_> {
        type Count = u16;
        fn count(&self) -> u16 {
            self.count.get()
        }
        fn direction(&self) -> RotaryDirection {
            RotaryDirection::Upcounting
        }
    }

    #[test]
    fn full_revolution_reads_360() {
        let count = Cell::new(100);
        let mut enc = N20::new(FakeQei { count: &count }, 400.0);
        count.set(500);
        assert_abs_diff_eq!(enc.angle(), 360.0, epsilon = 1e-4);
    }

    #[test]
    fn counter_wrap_is_continuous() {
        let count = Cell::new(65_530);
        let mut enc = N20::new(FakeQei { count: &count }, 400.0);
        count.set(10);
        assert_eq!(enc.update(), 16);
        count.set(65_530);
        assert_eq!(enc.update(), 0);
        assert_abs_diff_eq!(enc.get_angle(), 0.0);
    }

    #[test]
    fn clearing_rezeroes_at_current_count() {
        let count = Cell::new(0);
        let mut enc = N20::new(FakeQei { count: &count }, 400.0);
        count.set(200);
        assert_abs_diff_eq!(enc.angle(), 180.0, epsilon = 1e-4);
        enc.clear_counts();
        assert_eq!(enc.angle(), 0.0);
        count.set(100);
        assert_abs_diff_eq!(enc.angle(), -90.0, epsilon = 1e-4);
    }

    #[test]
    fn speed_settles_to_constant_rate() {
        let count = Cell::new(0);
        let mut enc = N20::new(FakeQei { count: &count }, 400.0);
        let mut speed = 0.0;
        for i in 1..=SPEED_FILTER_SIZE as u16 {
            // 4 counts per ms = 3.6 deg per ms
            count.set(i * 4);
            speed = enc.get_speed(0.001);
        }
        assert_abs_diff_eq!(speed, 3600.0, epsilon = 0.5);
    }
}
