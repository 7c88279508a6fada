// Wheel and heading geometry shared by the controllers.
// Distances are in centimeters, wheel rotation and headings in degrees.

use core::f32::consts::PI;
use core::ops::Mul;

/// Mounting or travel sign of a wheel, motor or gyro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward = -1,
    Forward = 1,
}
impl Direction {
    /// Sign of `value`; zero counts as forward.
    pub fn of(value: f32) -> Direction {
        if value < 0.0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    pub fn sign(self) -> f32 {
        self as i32 as f32
    }
}
impl Mul<f32> for Direction {
    type Output = f32;
    fn mul(self, rhs: f32) -> Self::Output {
        self as i32 as f32 * rhs
    }
}
impl Mul<Direction> for Direction {
    type Output = Direction;
    fn mul(self, rhs: Direction) -> Self::Output {
        if self == rhs {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// Canonical heading range used before differencing two headings.
pub const HEADING_FOLD_DEG: f32 = 180.0;

/// Folds a heading into (-180, 180) with a truncating remainder.
///
/// Headings 180 degrees apart fold onto the same value (10 and 190 both
/// read as 10). Negative headings keep their sign, so a robot that drifted
/// to -1 still reads 1 degree away from 0 instead of 179.
pub fn normalize(heading: f32) -> f32 {
    heading % HEADING_FOLD_DEG
}

/// Signed difference `normalize(target) - normalize(current)`.
pub fn heading_error(target: f32, current: f32) -> f32 {
    normalize(target) - normalize(current)
}

pub fn wheel_circumference(diameter_cm: f32) -> f32 {
    diameter_cm * PI
}

/// Converts accumulated wheel rotation to travelled centimeters.
pub fn degrees_to_cm(
    angle_deg: f32,
    diameter_cm: f32,
    direction: Direction,
    calibration: f32,
) -> f32 {
    direction * (angle_deg / 360.0 * wheel_circumference(diameter_cm) * calibration)
}

/// Converts a travel distance back to wheel rotation.
pub fn cm_to_degrees(
    distance_cm: f32,
    diameter_cm: f32,
    direction: Direction,
    calibration: f32,
) -> f32 {
    direction * (distance_cm / (wheel_circumference(diameter_cm) * calibration) * 360.0)
}

/// Average of both wheels' travel. Assumes equal arc length on both sides,
/// which turning maneuvers intentionally violate.
pub fn average_cm(left_cm: f32, right_cm: f32) -> f32 {
    (left_cm + right_cm) / 2.0
}

/// Arc each wheel travels while the robot turns in place by `degrees`.
pub fn turn_arc_cm(degrees: f32, wheel_base_cm: f32) -> f32 {
    degrees / 360.0 * wheel_base_cm * PI
}

/// Calibration factor that maps the uncalibrated encoder distance onto
/// the distance measured by hand.
pub fn calibration_factor(measured_cm: f32, encoder_cm: f32) -> f32 {
    measured_cm / encoder_cm
}
