use libm::fabsf;
use log::debug;

use crate::controller::config::DriveConfig;
use crate::controller::drive::Drive;
use crate::filtering::exponential::ExponentialFilter;
use crate::geometry::{self, Direction, HEADING_FOLD_DEG};
use crate::hardware::{Clock, HeadingSensor, TankDrive, WheelEncoder};

/// Steering correction computed for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Signed heading error, target minus current.
    pub diff: f32,
    /// Absolute error clamped to 0..=180.
    pub error: f32,
    pub direction: Direction,
    /// Magnitude after deadband, before smoothing.
    pub raw_steering: f32,
    /// Signed, smoothed steering sent to the mixer.
    pub steering: f32,
}

/// Outcome of one heading-controller tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steered {
    pub error: f32,
    /// Whether the command reached the motors.
    pub sent: bool,
}

pub struct HeadingController {
    steering: ExponentialFilter<f32>,
    last_diff: f32,
}
impl HeadingController {
    pub fn new(smoothing: f32) -> HeadingController {
        HeadingController {
            steering: ExponentialFilter::new(smoothing),
            last_diff: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.steering.reset();
        self.last_diff = 0.0;
    }

    pub fn last_steering(&self) -> f32 {
        self.steering.value()
    }

    pub fn last_diff(&self) -> f32 {
        self.last_diff
    }

    pub fn error(target: f32, current: f32) -> f32 {
        fabsf(geometry::heading_error(target, current)).min(HEADING_FOLD_DEG)
    }

    /// Computes the correction toward `target` without committing it.
    pub fn correct(&self, config: &DriveConfig, target: f32, current: f32) -> Correction {
        let tuning = &config.tuning;
        let diff = geometry::heading_error(target, current);
        let direction = Direction::of(diff);
        let error = fabsf(diff).min(HEADING_FOLD_DEG);

        let mut steering = config.min_speed / 2.0 + error / HEADING_FOLD_DEG * config.max_steering;
        steering = steering.max(0.0).min(config.max_steering);

        // cancel as soon as a small error is already shrinking
        if error < tuning.deadband_deg
            && steering < fabsf(self.steering.value()) - tuning.deadband_margin
        {
            steering = 0.0;
        }
        if error <= tuning.heading_tolerance_deg {
            steering = 0.0;
        }

        Correction {
            diff,
            error,
            direction,
            raw_steering: steering,
            steering: self
                .steering
                .peek_weighted(tuning.steering_smoothing, direction * steering),
        }
    }

    pub fn commit(&mut self, correction: &Correction) {
        self.steering.set(correction.steering);
        self.last_diff = correction.diff;
    }
}

impl<'a, L, R, M, G, C> Drive<'a, L, R, M, G, C>
where
    L: WheelEncoder,
    R: WheelEncoder,
    M: TankDrive,
    G: HeadingSensor,
    C: Clock,
{
    /// Steers toward `target` heading while driving at `speed`
    /// (`None` keeps the current speed). Returns the absolute heading error
    /// measured before the correction.
    pub fn steer_toward(&mut self, target: f32, speed: Option<f32>, ramp_percent: f32) -> f32 {
        self.steer(target, speed, ramp_percent).error
    }

    pub(crate) fn steer(&mut self, target: f32, speed: Option<f32>, ramp_percent: f32) -> Steered {
        let current = self.heading();
        let correction = self.state.heading.correct(&self.config, target, current);

        let sent = self.motor(speed, correction.steering, ramp_percent);
        if !sent {
            return Steered {
                error: correction.error,
                sent,
            };
        }
        self.state.heading.commit(&correction);

        if self.debug {
            debug!(
                "heading D:{} W:{} S:{}",
                correction.error, target, correction.steering
            );
        }

        self.pause(self.config.tuning.heading_settle_ms);
        Steered {
            error: correction.error,
            sent,
        }
    }
}
