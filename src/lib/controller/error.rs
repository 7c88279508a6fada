use thiserror::Error;

/// Reasons the drive refuses to start. All of them are fatal: the robot
/// cannot operate safely and must not try a degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SetupError {
    #[error("wheel diameter ({diameter} cm) and wheel base ({base} cm) must be positive")]
    InvalidGeometry { diameter: f32, base: f32 },

    #[error("minimum speed ({min_speed}) and maximum steering ({max_steering}) must not be negative")]
    InvalidSpeedLimits { min_speed: f32, max_steering: f32 },

    #[error("heading sensor not ready")]
    HeadingSensorNotReady,

    #[error("gyro drift {drift} deg exceeds tolerance {tolerance} deg")]
    GyroDrift { drift: f32, tolerance: f32 },
}

/// Rejected calibration requests. The calibration factor is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CalibrationError {
    #[error("encoders report no travel since the last reset")]
    NoTravel,

    #[error("measured distance {0} cm is not a positive finite value")]
    InvalidMeasurement(f32),
}
