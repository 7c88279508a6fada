use crate::controller::error::SetupError;
use crate::controller::motor::fix_speed;
use crate::geometry::{self, Direction};

/// Empirically tuned timing budgets and tolerances.
///
/// None of these are architectural; the defaults are the values the
/// controller was tuned with on the reference robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Pause after every motor command before encoders are re-sampled.
    pub motor_settle_ms: u32,
    /// Pause after a heading correction before the gyro is trusted again.
    pub heading_settle_ms: u32,
    /// Maximum heading-controller ticks for one in-place rotation.
    pub rotation_budget: u32,
    /// Pause after a halting rotation so residual momentum bleeds off.
    pub rotation_settle_ms: u32,
    /// Heading error accepted as converged.
    pub heading_tolerance_deg: f32,
    /// Below this error a shrinking correction is cancelled.
    pub deadband_deg: f32,
    pub deadband_margin: f32,
    /// Near-target band in which a cruising segment hands over to the next.
    pub cruise_band_cm: f32,
    /// Final positioning tolerance of a decelerating segment.
    pub goal_band_cm: f32,
    /// Speeds at or below this magnitude count as a true stop.
    pub stop_epsilon: f32,
    pub drift_tolerance_deg: f32,
    /// Slowest permitted ramp, in percent of the gap per tick.
    pub ramp_min_percent: f32,
    /// Weight of the newest steering value in the smoothing filter.
    pub steering_smoothing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            motor_settle_ms: 20,
            heading_settle_ms: 150,
            rotation_budget: 50,
            rotation_settle_ms: 500,
            heading_tolerance_deg: 0.9,
            deadband_deg: 5.0,
            deadband_margin: 1.0,
            cruise_band_cm: 0.9,
            goal_band_cm: 0.3,
            stop_epsilon: 0.01,
            drift_tolerance_deg: 0.001,
            ramp_min_percent: 10.0,
            steering_smoothing: 0.75,
        }
    }
}

/// Geometry and limits of the robot, fixed between setups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveConfig {
    pub wheel_diameter_cm: f32,
    pub wheel_base_cm: f32,
    pub motor_direction: Direction,
    pub gyro_direction: Direction,
    /// Smallest power that still overcomes static friction.
    pub min_speed: f32,
    pub max_steering: f32,
    pub tuning: Tuning,
    calibration: f32,
}

impl DriveConfig {
    pub fn new(wheel_diameter_cm: f32, wheel_base_cm: f32) -> Self {
        Self {
            wheel_diameter_cm,
            wheel_base_cm,
            motor_direction: Direction::Forward,
            gyro_direction: Direction::Forward,
            min_speed: 3.0,
            max_steering: 15.0,
            tuning: Tuning::default(),
            calibration: 1.0,
        }
    }

    /// `false` when the motors are mounted so that positive power drives
    /// the robot backwards.
    pub fn with_forward(mut self, forward: bool) -> Self {
        self.motor_direction = if forward {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self
    }

    pub fn with_gyro_direction(mut self, direction: Direction) -> Self {
        self.gyro_direction = direction;
        self
    }

    pub fn with_min_speed(mut self, min_speed: f32) -> Self {
        self.min_speed = min_speed;
        self
    }

    pub fn with_max_steering(mut self, max_steering: f32) -> Self {
        self.max_steering = max_steering;
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn calibration(&self) -> f32 {
        self.calibration
    }

    pub(crate) fn set_calibration(&mut self, factor: f32) {
        self.calibration = factor;
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if !(self.wheel_diameter_cm > 0.0 && self.wheel_base_cm > 0.0) {
            return Err(SetupError::InvalidGeometry {
                diameter: self.wheel_diameter_cm,
                base: self.wheel_base_cm,
            });
        }
        if !(self.min_speed >= 0.0 && self.max_steering >= 0.0) {
            return Err(SetupError::InvalidSpeedLimits {
                min_speed: self.min_speed,
                max_steering: self.max_steering,
            });
        }
        Ok(())
    }

    pub fn fix_speed(&self, speed: f32, allow_zero: bool) -> f32 {
        fix_speed(speed, self.min_speed, self.tuning.stop_epsilon, allow_zero)
    }

    /// Encoder degrees to calibrated centimeters.
    pub fn to_cm(&self, angle_deg: f32) -> f32 {
        geometry::degrees_to_cm(
            angle_deg,
            self.wheel_diameter_cm,
            self.motor_direction,
            self.calibration,
        )
    }

    /// Speed magnitude above which a segment is still cruising.
    pub fn cruise_threshold(&self) -> f32 {
        2.0 * self.min_speed
    }
}

/// Gains and limits of the per-wheel speed PID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelTuning {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub p_lim: f32,
    pub i_lim: f32,
    pub d_lim: f32,
    pub out_lim: f32,
}

impl Default for WheelTuning {
    fn default() -> Self {
        Self {
            kp: 0.000015,
            ki: 0.003,
            kd: 0.00012,
            p_lim: 100.0,
            i_lim: 100.0,
            d_lim: 100.0,
            out_lim: 100.0,
        }
    }
}
