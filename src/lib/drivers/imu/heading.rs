use libm::fabsf;

use crate::filtering::sma::SmaFilter;

/// Rates below this are treated as sensor noise, in degrees per second.
pub const DEFAULT_RATE_DEADBAND_DPS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Averaging the resting rate into the bias.
    Calibrating,
    /// Integrating at rest to measure the residual drift.
    MeasuringDrift,
    Ready,
}

/// Integrates gyro z rate into a heading.
///
/// The first `N` samples must be taken at rest and estimate the rate bias.
/// The next `N` samples, also at rest, measure the drift: the mean absolute
/// heading change per sample once bias and deadband are applied.
pub struct GyroHeading<const N: usize> {
    phase: Phase,
    bias_dps: f32,
    deadband_dps: f32,
    heading: f32,
    bias_filter: SmaFilter<f32, N>,
    drift_filter: SmaFilter<f32, N>,
    drift: f32,
}

impl<const N: usize> GyroHeading<N> {
    pub fn new(deadband_dps: f32) -> Self {
        Self {
            phase: Phase::Calibrating,
            bias_dps: 0.0,
            deadband_dps,
            heading: 0.0,
            bias_filter: SmaFilter::new(),
            drift_filter: SmaFilter::new(),
            drift: 0.0,
        }
    }

    /// Feeds one rate sample taken `deltat` seconds after the previous one.
    pub fn update(&mut self, rate_dps: f32, deltat: f32) {
        match self.phase {
            Phase::Calibrating => {
                self.bias_filter.insert(rate_dps);
                if let Some(bias) = self.bias_filter.filtered() {
                    self.bias_dps = bias;
                    self.phase = Phase::MeasuringDrift;
                }
            }
            Phase::MeasuringDrift => {
                let delta = self.integrate(rate_dps, deltat);
                self.drift_filter.insert(fabsf(delta));
                if let Some(drift) = self.drift_filter.filtered() {
                    self.drift = drift;
                    self.heading = 0.0;
                    self.phase = Phase::Ready;
                }
            }
            Phase::Ready => {
                self.integrate(rate_dps, deltat);
            }
        }
    }

    fn integrate(&mut self, rate_dps: f32, deltat: f32) -> f32 {
        let mut rate = rate_dps - self.bias_dps;
        if fabsf(rate) < self.deadband_dps {
            rate = 0.0;
        }
        let delta = rate * deltat;
        self.heading += delta;
        delta
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn reset_heading(&mut self) {
        self.heading = 0.0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn bias(&self) -> f32 {
        self.bias_dps
    }

    /// Drift measured at rest; meaningful once ready.
    pub fn drift(&self) -> f32 {
        self.drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn settle<const N: usize>(gyro: &mut GyroHeading<N>, rate: f32) {
        while !gyro.is_ready() {
            gyro.update(rate, 0.01);
        }
    }

    #[test]
    fn bias_is_removed_after_calibration() {
        let mut gyro = GyroHeading::<10>::new(DEFAULT_RATE_DEADBAND_DPS);
        settle(&mut gyro, 0.3);
        assert_abs_diff_eq!(gyro.bias(), 0.3, epsilon = 1e-5);
        assert_eq!(gyro.drift(), 0.0);

        // 90 dps above bias for one second
        for _ in 0..100 {
            gyro.update(90.3, 0.01);
        }
        assert_abs_diff_eq!(gyro.heading(), 90.0, epsilon = 1e-2);
    }

    #[test]
    fn moving_robot_shows_drift() {
        let mut gyro = GyroHeading::<4>::new(DEFAULT_RATE_DEADBAND_DPS);
        for _ in 0..4 {
            gyro.update(0.0, 0.01);
        }
        assert_eq!(gyro.phase(), Phase::MeasuringDrift);
        settle(&mut gyro, 2.0);
        assert_abs_diff_eq!(gyro.drift(), 0.02, epsilon = 1e-5);
        assert_eq!(gyro.heading(), 0.0);
    }

    #[test]
    fn noise_inside_deadband_is_ignored() {
        let mut gyro = GyroHeading::<4>::new(DEFAULT_RATE_DEADBAND_DPS);
        settle(&mut gyro, 0.0);
        for i in 0..50 {
            gyro.update(if i % 2 == 0 { 0.05 } else { -0.05 }, 0.01);
        }
        assert_eq!(gyro.heading(), 0.0);
        gyro.update(10.0, 0.5);
        gyro.reset_heading();
        assert_eq!(gyro.heading(), 0.0);
    }
}
