use core::fmt;

use libm::{fabsf, roundf};
use log::info;

use crate::controller::config::DriveConfig;
use crate::controller::error::{CalibrationError, SetupError};
use crate::controller::state::MotionState;
use crate::geometry;
use crate::hardware::{Clock, Hardware, HeadingSensor, StopLatch, TankDrive, WheelEncoder};

/// The drive controller: owns the hardware, the configuration and the live
/// motion state. Every maneuver runs to completion on the caller's thread;
/// the shared [`StopLatch`] is the only way to cut one short.
pub struct Drive<'a, L, R, M, G, C> {
    pub(crate) hw: Hardware<L, R, M, G, C>,
    pub(crate) config: DriveConfig,
    pub(crate) state: MotionState,
    pub(crate) latch: &'a StopLatch,
    pub(crate) debug: bool,
}

impl<'a, L, R, M, G, C> Drive<'a, L, R, M, G, C>
where
    L: WheelEncoder,
    R: WheelEncoder,
    M: TankDrive,
    G: HeadingSensor,
    C: Clock,
{
    /// Validates the configuration, gates on gyro health and resets the
    /// robot. Any error here means the robot must not drive.
    pub fn setup(
        mut hw: Hardware<L, R, M, G, C>,
        config: DriveConfig,
        latch: &'a StopLatch,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        if !hw.gyro.is_ready() {
            return Err(SetupError::HeadingSensorNotReady);
        }
        let drift = hw.gyro.drift();
        let tolerance = config.tuning.drift_tolerance_deg;
        if !(fabsf(drift) <= tolerance) {
            return Err(SetupError::GyroDrift { drift, tolerance });
        }

        let mut drive = Drive {
            hw,
            state: MotionState::new(config.tuning.steering_smoothing),
            config,
            latch,
            debug: false,
        };
        drive.reset();

        info!(
            "drive ready: wheel {} cm, base {} cm, drift {} deg",
            config.wheel_diameter_cm, config.wheel_base_cm, drift
        );
        Ok(drive)
    }

    /// Brakes, zeroes the motion state, clears both encoders and re-zeroes
    /// the heading. The stop latch is left alone.
    pub fn reset(&mut self) {
        self.motor_stop(true);
        self.hw.left.clear_counts();
        self.hw.right.clear_counts();
        self.hw.gyro.reset();
        info!("drive reset");
    }

    /// Stops both wheels and forgets every ramp, smoothing and odometry
    /// value. `hold` engages the brake.
    pub fn motor_stop(&mut self, hold: bool) {
        self.hw.motors.set_brake(hold);
        self.hw.motors.stop();
        self.state.reset();
    }

    pub fn is_stopped(&self) -> bool {
        self.latch.is_tripped()
    }

    pub fn stop_latch(&self) -> &'a StopLatch {
        self.latch
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state.moving
    }

    pub fn current_speed(&self) -> f32 {
        self.state.current_speed
    }

    pub fn last_motor_speed(&self) -> f32 {
        self.state.last_motor_speed()
    }

    pub fn target_distance(&self) -> f32 {
        self.state.target_distance
    }

    /// Gyro heading corrected for the mounting direction, in degrees.
    pub fn heading(&mut self) -> f32 {
        self.config.gyro_direction * self.hw.gyro.angle()
    }

    pub fn left_angle(&mut self) -> f32 {
        self.hw.left.angle()
    }

    pub fn right_angle(&mut self) -> f32 {
        self.hw.right.angle()
    }

    /// Averaged distance for a pair of encoder readings, in cm.
    pub fn distance_of(&self, left_deg: f32, right_deg: f32) -> f32 {
        geometry::average_cm(self.config.to_cm(left_deg), self.config.to_cm(right_deg))
    }

    /// Averaged distance travelled since the last reset, in cm.
    pub fn distance(&mut self) -> f32 {
        let left = self.hw.left.angle();
        let right = self.hw.right.angle();
        self.distance_of(left, right)
    }

    /// Sets the calibration factor from a distance measured by hand over
    /// the travel since the last reset. Returns the new factor.
    pub fn calibrate(&mut self, measured_cm: f32) -> Result<f32, CalibrationError> {
        if !(measured_cm.is_finite() && measured_cm > 0.0) {
            return Err(CalibrationError::InvalidMeasurement(measured_cm));
        }
        let left = self.hw.left.angle();
        let right = self.hw.right.angle();
        let uncalibrated = |deg: f32| {
            geometry::degrees_to_cm(
                deg,
                self.config.wheel_diameter_cm,
                self.config.motor_direction,
                1.0,
            )
        };
        let encoder_cm = fabsf(geometry::average_cm(uncalibrated(left), uncalibrated(right)));
        if encoder_cm <= self.config.tuning.stop_epsilon {
            return Err(CalibrationError::NoTravel);
        }

        let factor = geometry::calibration_factor(measured_cm, encoder_cm);
        self.config.set_calibration(factor);
        info!("calibration factor {} ({} cm measured, {} cm by encoders)", factor, measured_cm, encoder_cm);
        Ok(factor)
    }

    pub fn info(&mut self) -> DriveInfo {
        let left_cm = self.config.to_cm(self.hw.left.angle());
        let right_cm = self.config.to_cm(self.hw.right.angle());
        DriveInfo {
            heading: self.heading(),
            left_cm,
            right_cm,
            distance_cm: geometry::average_cm(left_cm, right_cm),
            moving: self.state.moving,
            speed: self.state.current_speed,
        }
    }

    /// Hands the hardware back, e.g. to inspect it after a run.
    pub fn release(self) -> Hardware<L, R, M, G, C> {
        self.hw
    }

    pub(crate) fn pause(&mut self, ms: u32) {
        if ms > 0 {
            self.hw.clock.pause(ms);
        }
    }
}

impl<'a, L, R, M, G, C> Drive<'a, L, R, M, G, C> {
    pub fn hardware(&self) -> &Hardware<L, R, M, G, C> {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut Hardware<L, R, M, G, C> {
        &mut self.hw
    }
}

/// Diagnostics snapshot for a screen or console.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveInfo {
    pub heading: f32,
    pub left_cm: f32,
    pub right_cm: f32,
    pub distance_cm: f32,
    pub moving: bool,
    pub speed: f32,
}

fn one_decimal(value: f32) -> f32 {
    roundf(value * 10.0) / 10.0
}

impl fmt::Display for DriveInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  GYRO: {:.1}", one_decimal(self.heading))?;
        writeln!(f, "  LEFT: {:.1}", one_decimal(self.left_cm))?;
        writeln!(f, " RIGHT: {:.1}", one_decimal(self.right_cm))?;
        writeln!(f, " MOTOR: {:.1}", one_decimal(self.distance_cm))?;
        write!(
            f,
            " SPEED: {:.1}{}",
            one_decimal(self.speed),
            if self.moving { " (moving)" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_prints_one_decimal() {
        let info = DriveInfo {
            heading: 12.345,
            left_cm: -0.04,
            right_cm: 3.0,
            distance_cm: 1.48,
            moving: true,
            speed: 30.0,
        };
        let mut text = String::new();
        fmt::write(&mut text, format_args!("{}", info)).unwrap();
        assert!(text.contains("GYRO: 12.3"));
        assert!(text.contains("RIGHT: 3.0"));
        assert!(text.contains("MOTOR: 1.5"));
        assert!(text.contains("SPEED: 30.0 (moving)"));
    }
}
