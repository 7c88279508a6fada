//! Closed-loop drive control: motor mixing, heading correction, in-place
//! rotation and distance/heading segments, all run through one [`Drive`].

pub mod config;
pub mod drive;
pub mod error;
pub mod heading;
pub mod motor;
pub mod profile;
pub mod rotation;
pub mod route;
pub mod state;
pub mod wheels;

pub use crate::geometry::Direction;
pub use config::{DriveConfig, Tuning, WheelTuning};
pub use drive::{Drive, DriveInfo};
pub use error::{CalibrationError, SetupError};
pub use motor::fix_speed;
pub use profile::SegmentOutcome;
pub use rotation::Convergence;
pub use route::Leg;
pub use state::MotionState;
