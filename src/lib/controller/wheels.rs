use pid::Pid;

use crate::controller::config::WheelTuning;
use crate::controller::motor::MAX_POWER;
use crate::drivers::motor::WheelMotor;
use crate::geometry::Direction;

/// Closed-loop speed regulation for both drive wheels.
///
/// Tank powers (percent of full speed) become wheel speed setpoints in
/// degrees per second, and each wheel's PID turns the measured speed into
/// motor power.
pub struct WheelSpeedControl<ML, MR> {
    left: WheelController<ML>,
    right: WheelController<MR>,
    directions: WheelDirections,
    max_speed_dps: f32,
    braked: bool,
}
impl<ML, MR> WheelSpeedControl<ML, MR>
where
    ML: WheelMotor,
    MR: WheelMotor,
{
    pub fn new(
        left: ML,
        right: MR,
        tune: WheelTuning,
        directions: WheelDirections,
        max_speed_dps: f32,
    ) -> WheelSpeedControl<ML, MR> {
        let mut wheels = WheelSpeedControl {
            left: WheelController::<ML>::new(left, tune),
            right: WheelController::<MR>::new(right, tune),
            directions,
            max_speed_dps,
            braked: false,
        };
        wheels.left.start();
        wheels.right.start();
        return wheels;
    }

    /// Maps tank powers onto wheel speed setpoints. Leaves brake mode.
    pub fn set_power_targets(&mut self, targets: &WheelSetPoints) {
        self.braked = false;
        self.left
            .set_speed_target(self.directions.left * self.to_dps(targets.left));
        self.right
            .set_speed_target(self.directions.right * self.to_dps(targets.right));
    }

    /// Runs one PID step per wheel. While braked both motors are held and
    /// the integrators stay empty.
    pub fn step(&mut self, vels: &WheelSpeeds) -> (f32, f32) {
        if self.braked {
            self.left.brake();
            self.right.brake();
            return (0.0, 0.0);
        }
        (
            self.left.step(self.directions.left * vels.left),
            self.right.step(self.directions.right * vels.right),
        )
    }

    pub fn brake(&mut self) {
        self.braked = true;
        self.left.set_speed_target(0.0);
        self.right.set_speed_target(0.0);
        self.left.brake();
        self.right.brake();
    }

    pub fn is_braked(&self) -> bool {
        self.braked
    }

    fn to_dps(&self, power: f32) -> f32 {
        power.max(-MAX_POWER).min(MAX_POWER) / MAX_POWER * self.max_speed_dps
    }
}

struct WheelController<MotorT> {
    motor: MotorT,
    pid: Pid<f32>,
}
impl<MotorT> WheelController<MotorT>
where
    MotorT: WheelMotor,
{
    fn new(motor: MotorT, t: WheelTuning) -> WheelController<MotorT> {
        WheelController {
            motor,
            pid: Pid::new(t.kp, t.ki, t.kd, t.p_lim, t.i_lim, t.d_lim, t.out_lim, 0.0),
        }
    }

    fn start(&mut self) {
        self.motor.start();
    }

    fn set_speed_target(&mut self, target: f32) {
        self.pid.setpoint = target;
    }

    fn step(&mut self, current_velocity: f32) -> f32 {
        let output = self.pid.next_control_output(current_velocity);
        self.motor.set_power(output.output);
        return output.output;
    }

    fn brake(&mut self) {
        self.pid.reset_integral_term();
        self.motor.brake();
    }
}

/// Measured wheel speeds in degrees per second, robot frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelSpeeds {
    pub left: f32,
    pub right: f32,
}

/// Tank powers in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelSetPoints {
    pub left: f32,
    pub right: f32,
}

/// Mounting sign of each motor/encoder pair.
#[derive(Debug, Clone, Copy)]
pub struct WheelDirections {
    pub left: Direction,
    pub right: Direction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeMotor {
        started: bool,
        power: f32,
        braked: bool,
    }
    impl WheelMotor for &mut FakeMotor {
        fn start(&mut self) {
            self.started = true;
        }
        fn set_power(&mut self, power: f32) {
            self.power = power;
            self.braked = false;
        }
        fn brake(&mut self) {
            self.power = 0.0;
            self.braked = true;
        }
    }

    const DIRECTIONS: WheelDirections = WheelDirections {
        left: Direction::Forward,
        right: Direction::Backward,
    };

    #[test]
    fn new_starts_both_motors() {
        let (mut l, mut r) = (FakeMotor::default(), FakeMotor::default());
        let _wheels = WheelSpeedControl::new(&mut l, &mut r, WheelTuning::default(), DIRECTIONS, 600.0);
        assert!(l.started && r.started);
    }

    #[test]
    fn power_follows_mounting_direction() {
        let (mut l, mut r) = (FakeMotor::default(), FakeMotor::default());
        {
            let mut wheels =
                WheelSpeedControl::new(&mut l, &mut r, WheelTuning::default(), DIRECTIONS, 600.0);
            wheels.set_power_targets(&WheelSetPoints {
                left: 50.0,
                right: 50.0,
            });
            let (left, right) = wheels.step(&WheelSpeeds::default());
            assert!(left > 0.0);
            assert!(right < 0.0);
        }
        assert!(l.power > 0.0);
        assert!(r.power < 0.0);
    }

    #[test]
    fn brake_holds_until_next_command() {
        let (mut l, mut r) = (FakeMotor::default(), FakeMotor::default());
        {
            let mut wheels =
                WheelSpeedControl::new(&mut l, &mut r, WheelTuning::default(), DIRECTIONS, 600.0);
            wheels.set_power_targets(&WheelSetPoints {
                left: 80.0,
                right: -80.0,
            });
            wheels.step(&WheelSpeeds::default());
            wheels.brake();
            assert_eq!(wheels.step(&WheelSpeeds::default()), (0.0, 0.0));
            assert!(wheels.is_braked());

            wheels.set_power_targets(&WheelSetPoints {
                left: 10.0,
                right: 10.0,
            });
            assert!(!wheels.is_braked());
            wheels.step(&WheelSpeeds::default());
        }
        assert!(!l.braked);
        assert!(l.power > 0.0);
    }
}
