use crate::controller::heading::HeadingController;
use crate::controller::motor::MotorMixer;

/// Live state of the drive, mutated every control tick.
pub struct MotionState {
    pub(crate) moving: bool,
    /// Signed rolling speed; carried between segments so chained segments
    /// ramp smoothly instead of restarting from zero.
    pub(crate) current_speed: f32,
    /// Running odometry target in cm, extended by every segment.
    pub(crate) target_distance: f32,
    pub(crate) mixer: MotorMixer,
    pub(crate) heading: HeadingController,
}

impl MotionState {
    pub fn new(steering_smoothing: f32) -> Self {
        Self {
            moving: false,
            current_speed: 0.0,
            target_distance: 0.0,
            mixer: MotorMixer::new(),
            heading: HeadingController::new(steering_smoothing),
        }
    }

    pub fn reset(&mut self) {
        self.moving = false;
        self.current_speed = 0.0;
        self.target_distance = 0.0;
        self.mixer.reset();
        self.heading.reset();
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    pub fn last_motor_speed(&self) -> f32 {
        self.mixer.last_speed()
    }

    pub fn last_steering(&self) -> f32 {
        self.heading.last_steering()
    }

    pub fn last_gyro_diff(&self) -> f32 {
        self.heading.last_diff()
    }
}
