use libm::fabsf;
use log::debug;

use crate::controller::config::DriveConfig;
use crate::controller::drive::Drive;
use crate::filtering::exponential::ExponentialFilter;
use crate::geometry::Direction;
use crate::hardware::{Clock, HeadingSensor, TankDrive, WheelEncoder};

/// Largest power either wheel accepts, in percent.
pub const MAX_POWER: f32 = 100.0;

/// Floors a speed to the minimum effective speed, keeping its sign.
///
/// With `allow_zero`, magnitudes up to `stop_epsilon` become exactly zero;
/// without it even zero is raised to `min_speed` (forward).
pub fn fix_speed(speed: f32, min_speed: f32, stop_epsilon: f32, allow_zero: bool) -> f32 {
    if allow_zero && fabsf(speed) <= stop_epsilon {
        return 0.0;
    }
    if fabsf(speed) < min_speed {
        Direction::of(speed) * min_speed
    } else {
        speed
    }
}

/// One combined command for both wheels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelCommand {
    pub left: f32,
    pub right: f32,
    /// Post-ramp forward speed.
    pub speed: f32,
    pub steering: f32,
}
impl WheelCommand {
    pub fn is_moving(&self) -> bool {
        self.speed != 0.0 || self.steering != 0.0
    }
}

/// Ramps the forward speed and mixes in steering.
pub struct MotorMixer {
    speed: ExponentialFilter<f32>,
}
impl MotorMixer {
    pub fn new() -> MotorMixer {
        MotorMixer {
            speed: ExponentialFilter::new(1.0),
        }
    }

    pub fn reset(&mut self) {
        self.speed.reset();
    }

    /// Forward speed actually sent last.
    pub fn last_speed(&self) -> f32 {
        self.speed.value()
    }

    pub fn clamp_ramp(config: &DriveConfig, ramp_percent: f32) -> f32 {
        let ramp = fabsf(ramp_percent);
        if ramp.is_nan() {
            return config.tuning.ramp_min_percent;
        }
        ramp.max(config.tuning.ramp_min_percent).min(100.0)
    }

    /// Computes the next command without committing it. `None` keeps the
    /// last forward speed.
    pub fn mix(
        &self,
        config: &DriveConfig,
        requested: Option<f32>,
        steering: f32,
        ramp_percent: f32,
    ) -> WheelCommand {
        let ramp = MotorMixer::clamp_ramp(config, ramp_percent);
        let target = requested.unwrap_or(self.speed.value());
        let ramped = self.speed.peek_weighted(ramp / 100.0, target);
        let speed = config.fix_speed(ramped, true);

        let forward = config.motor_direction * speed;
        WheelCommand {
            left: (forward - steering).max(-MAX_POWER).min(MAX_POWER),
            right: (forward + steering).max(-MAX_POWER).min(MAX_POWER),
            speed,
            steering,
        }
    }

    pub fn commit(&mut self, command: &WheelCommand) {
        self.speed.set(command.speed);
    }
}

impl Default for MotorMixer {
    fn default() -> Self {
        Self::new()
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
    /// Ramps toward `speed` by `ramp_percent` of the remaining gap, mixes in
    /// `steering` and sends one command to both wheels.
    ///
    /// Returns `false` without side effects if the stop latch is tripped.
    pub fn motor(&mut self, speed: Option<f32>, steering: f32, ramp_percent: f32) -> bool {
        if self.is_stopped() {
            return false;
        }
        let command = self
            .state
            .mixer
            .mix(&self.config, speed, steering, ramp_percent);
        if self.is_stopped() {
            return false;
        }

        self.hw.motors.tank(command.left, command.right);
        self.state.mixer.commit(&command);
        self.state.moving = command.is_moving();

        if self.debug {
            debug!(
                "motor P:{} G:{} L:{}",
                MotorMixer::clamp_ramp(&self.config, ramp_percent),
                command.speed,
                command.steering
            );
        }

        self.pause(self.config.tuning.motor_settle_ms);
        true
    }
}
