use gyrodrive::controller::{Leg, WheelTuning};

pub const MOTOR_KP: f32 = 0.000015;
pub const MOTOR_KI: f32 = 0.003;
pub const MOTOR_KD: f32 = 0.00012;
pub const MOTOR_OUT_LIM: f32 = 100.0;
pub const MOTOR_P_LIM: f32 = MOTOR_OUT_LIM;
pub const MOTOR_I_LIM: f32 = MOTOR_OUT_LIM;
pub const MOTOR_D_LIM: f32 = MOTOR_OUT_LIM;

pub const WHEEL_TUNING: WheelTuning = WheelTuning {
    kp: MOTOR_KP,
    ki: MOTOR_KI,
    kd: MOTOR_KD,
    p_lim: MOTOR_P_LIM,
    i_lim: MOTOR_I_LIM,
    d_lim: MOTOR_D_LIM,
    out_lim: MOTOR_OUT_LIM,
};

pub const MIN_SPEED: f32 = 3.0;
pub const MAX_STEERING: f32 = 15.0;

pub const CRUISE_SPEED: f32 = 30.0;
pub const NUM_LEGS_IN_ROUTE: usize = 6;

// out 20 cm, quarter turn left on the move, back to the start line
pub const ROUTE: [Leg; NUM_LEGS_IN_ROUTE] = [
    Leg::new(20.0, 0.0, 0.0, Some(CRUISE_SPEED)),
    Leg::new(15.0, 0.0, 90.0, Some(CRUISE_SPEED)),
    Leg::new(20.0, 90.0, 90.0, Some(0.0)),
    Leg::new(-20.0, 90.0, 90.0, Some(CRUISE_SPEED)),
    Leg::new(-15.0, 90.0, 0.0, None),
    Leg::new(-20.0, 0.0, 0.0, Some(0.0)),
];
