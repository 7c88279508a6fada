mod common;

use approx::assert_abs_diff_eq;
use common::{config, drive, sim, wait};
use gyrodrive::controller::{CalibrationError, Direction, Drive, SetupError};
use gyrodrive::hardware::HeadingSensor;

#[test]
fn setup_resets_robot() {
    let (mut drive, _world) = drive();
    assert_eq!(drive.left_angle(), 0.0);
    assert_eq!(drive.right_angle(), 0.0);
    assert!(!drive.is_stopped());
    assert!(!drive.is_moving());
}

#[test]
fn setup_rejects_unready_gyro() {
    let (hw, world, latch) = sim();
    world.borrow_mut().gyro_ready = false;
    let result = Drive::setup(hw, config(), latch);
    assert!(matches!(result, Err(SetupError::HeadingSensorNotReady)));
}

#[test]
fn setup_rejects_drifting_gyro() {
    let (hw, world, latch) = sim();
    world.borrow_mut().gyro_drift = 0.002;
    let result = Drive::setup(hw, config(), latch);
    assert!(matches!(result, Err(SetupError::GyroDrift { .. })));

    let (hw, world, latch) = sim();
    world.borrow_mut().gyro_drift = -0.0005;
    assert!(Drive::setup(hw, config(), latch).is_ok());
}

#[test]
fn setup_rejects_bad_geometry() {
    let (hw, _world, latch) = sim();
    let result = Drive::setup(hw, config().with_max_steering(-2.0), latch);
    assert!(matches!(result, Err(SetupError::InvalidSpeedLimits { .. })));

    let (hw, _world, latch) = sim();
    let result = Drive::setup(hw, gyrodrive::controller::DriveConfig::new(6.2, 0.0), latch);
    assert!(matches!(result, Err(SetupError::InvalidGeometry { .. })));
}

#[test]
fn motor_stop_leaves_latch_alone() {
    let (mut drive, world) = drive();
    drive.stop_latch().trip();
    drive.motor_stop(true);
    assert!(drive.is_stopped());
    assert!(world.borrow().brake);
    drive.motor_stop(false);
    assert!(drive.is_stopped());
    assert!(!world.borrow().brake);
}

#[test]
fn reset_zeroes_encoders_and_state() {
    let (mut drive, _world) = drive();
    assert!(drive.motor(Some(30.0), 4.0, 100.0));
    wait(&mut drive, 1000);
    assert!(drive.is_moving());
    assert!(drive.left_angle() > 0.0);

    drive.stop_latch().trip();
    drive.reset();
    assert_eq!(drive.left_angle(), 0.0);
    assert_eq!(drive.right_angle(), 0.0);
    assert_eq!(drive.heading(), 0.0);
    assert!(!drive.is_moving());
    assert_eq!(drive.current_speed(), 0.0);
    assert_eq!(drive.last_motor_speed(), 0.0);
    assert_eq!(drive.target_distance(), 0.0);
    assert_eq!(drive.state().last_steering(), 0.0);
    assert!(drive.is_stopped());
}

#[test]
fn motor_drives_forward_and_backward() {
    let (mut drive, _world) = drive();
    drive.motor(Some(10.0), 0.0, 100.0);
    wait(&mut drive, 1000);
    drive.motor_stop(true);
    assert!(drive.left_angle() > 0.0);
    assert!(drive.right_angle() > 0.0);

    drive.reset();
    drive.motor(Some(-10.0), 5.0, 100.0);
    wait(&mut drive, 1000);
    drive.motor_stop(true);
    assert!(drive.left_angle() < 0.0);
    assert!(drive.right_angle() < 0.0);
}

#[test]
fn positive_steering_turns_toward_increasing_heading() {
    let (mut drive, _world) = drive();
    drive.motor(Some(0.0), 10.0, 100.0);
    wait(&mut drive, 1000);
    drive.motor_stop(true);
    assert!(drive.left_angle() < 0.0);
    assert!(drive.right_angle() > 0.0);
    assert!(drive.heading() > 0.0);

    drive.reset();
    drive.motor(Some(0.0), -10.0, 100.0);
    wait(&mut drive, 1000);
    drive.motor_stop(true);
    assert!(drive.left_angle() > 0.0);
    assert!(drive.right_angle() < 0.0);
    assert!(drive.heading() < 0.0);
}

#[test]
fn motor_is_refused_while_stopped() {
    let (mut drive, world) = drive();
    let before = world.borrow().commands;
    drive.stop_latch().trip();
    assert!(!drive.motor(Some(30.0), 0.0, 100.0));
    assert_eq!(world.borrow().commands, before);
    assert_eq!(drive.last_motor_speed(), 0.0);
    assert!(!drive.is_moving());

    drive.stop_latch().release();
    assert!(drive.motor(Some(30.0), 0.0, 100.0));
    assert_eq!(world.borrow().commands, before + 1);
}

#[test]
fn omitted_speed_continues_at_current_speed() {
    let (mut drive, world) = drive();
    drive.motor(Some(20.0), 0.0, 100.0);
    drive.motor(None, 0.0, 10.0);
    assert_abs_diff_eq!(drive.last_motor_speed(), 20.0, epsilon = 1e-5);
    assert_abs_diff_eq!(world.borrow().left_power, 20.0, epsilon = 1e-5);
}

#[test]
fn steer_toward_current_heading_drives_straight() {
    let (mut drive, _world) = drive();
    let error = drive.steer_toward(0.0, Some(30.0), 100.0);
    assert_eq!(error, 0.0);
    wait(&mut drive, 1000);
    drive.motor_stop(true);
    let left = drive.left_angle().round();
    let right = drive.right_angle().round();
    assert!(left > 0.0);
    assert_eq!(left, right);
}

#[test]
fn steer_toward_larger_heading_speeds_up_right_wheel() {
    let (mut drive, _world) = drive();
    let error = drive.steer_toward(10.0, Some(30.0), 100.0);
    assert_abs_diff_eq!(error, 10.0, epsilon = 1e-4);
    wait(&mut drive, 1000);
    drive.motor_stop(true);
    let left = drive.left_angle().round();
    let right = drive.right_angle().round();
    assert!(left > 0.0);
    assert!(right > left);
}

#[test]
fn reversed_gyro_flips_heading() {
    let (hw, world, latch) = sim();
    let config = config().with_gyro_direction(Direction::Backward);
    let mut drive = match Drive::setup(hw, config, latch) {
        Ok(drive) => drive,
        Err(e) => panic!("{}", e),
    };
    world.borrow_mut().heading = 12.0;
    assert_abs_diff_eq!(drive.heading(), -12.0, epsilon = 1e-5);
    assert_abs_diff_eq!(drive.hardware_mut().gyro.angle(), 12.0, epsilon = 1e-5);
}

#[test]
fn calibration_scales_distance() {
    let (mut drive, _world) = drive();
    assert_eq!(drive.calibrate(10.0), Err(CalibrationError::NoTravel));
    assert_eq!(
        drive.calibrate(-1.0),
        Err(CalibrationError::InvalidMeasurement(-1.0))
    );

    drive.motor(Some(30.0), 0.0, 100.0);
    wait(&mut drive, 1000);
    drive.motor_stop(true);
    let encoder_cm = drive.distance();
    assert!(encoder_cm > 5.0);

    let factor = drive.calibrate(encoder_cm * 1.1).unwrap();
    assert_abs_diff_eq!(factor, 1.1, epsilon = 1e-4);
    assert_abs_diff_eq!(drive.config().calibration(), 1.1, epsilon = 1e-4);
    assert_abs_diff_eq!(drive.distance(), encoder_cm * 1.1, epsilon = 1e-3);

    assert!(drive.calibrate(f32::NAN).is_err());
    assert_abs_diff_eq!(drive.config().calibration(), 1.1, epsilon = 1e-4);
}

#[test]
fn info_reports_snapshot() {
    let (mut drive, _world) = drive();
    drive.set_debug(true);
    assert!(drive.debug());
    drive.motor(Some(30.0), 0.0, 100.0);
    wait(&mut drive, 1000);

    let info = drive.info();
    assert!(info.moving);
    assert_abs_diff_eq!(info.distance_cm, drive.distance(), epsilon = 1e-4);
    let text = info.to_string();
    assert!(text.contains("GYRO: 0.0"));
    assert!(text.contains("(moving)"));
}
