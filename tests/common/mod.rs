#![allow(dead_code)]

use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use gyrodrive::controller::{Drive, DriveConfig};
use gyrodrive::hardware::{Clock, Hardware, HeadingSensor, StopLatch, TankDrive, WheelEncoder};

pub const WHEEL_DIAMETER_CM: f32 = 6.2;
pub const WHEEL_BASE_CM: f32 = 9.0;
/// Wheel rotation per percent of power, degrees per second.
pub const DPS_PER_POWER: f32 = 10.0;

/// Kinematic two-wheel robot. Wheels follow the commanded power without
/// inertia, and time only advances inside `Clock::pause`.
pub struct World {
    pub left_deg: f32,
    pub right_deg: f32,
    pub heading: f32,
    pub left_power: f32,
    pub right_power: f32,
    pub brake: bool,
    pub now_ms: u64,
    pub gyro_ready: bool,
    pub gyro_drift: f32,
    pub commands: u32,
    pub pauses: u32,
    pub trip_after_pauses: Option<u32>,
    pub commands_at_trip: Option<u32>,
    latch: &'static StopLatch,
}

impl World {
    fn step_ms(&mut self) {
        let dt = 0.001;
        let dl = self.left_power * DPS_PER_POWER * dt;
        let dr = self.right_power * DPS_PER_POWER * dt;
        self.left_deg += dl;
        self.right_deg += dr;

        let cm = |deg: f32| deg / 360.0 * WHEEL_DIAMETER_CM * PI;
        let turn_rad = (cm(dr) - cm(dl)) / WHEEL_BASE_CM;
        self.heading += turn_rad.to_degrees();
        self.now_ms += 1;
    }
}

pub type Shared = Rc<RefCell<World>>;

pub struct SimEncoder {
    world: Shared,
    left: bool,
    offset: f32,
}

impl WheelEncoder for SimEncoder {
    fn angle(&mut self) -> f32 {
        let w = self.world.borrow();
        (if self.left { w.left_deg } else { w.right_deg }) - self.offset
    }

    fn clear_counts(&mut self) {
        let w = self.world.borrow();
        self.offset = if self.left { w.left_deg } else { w.right_deg };
    }
}

pub struct SimMotors {
    world: Shared,
}

impl TankDrive for SimMotors {
    fn tank(&mut self, left: f32, right: f32) {
        let mut w = self.world.borrow_mut();
        w.left_power = left;
        w.right_power = right;
        w.commands += 1;
    }

    fn stop(&mut self) {
        let mut w = self.world.borrow_mut();
        w.left_power = 0.0;
        w.right_power = 0.0;
    }

    fn set_brake(&mut self, brake: bool) {
        self.world.borrow_mut().brake = brake;
    }
}

pub struct SimGyro {
    world: Shared,
    offset: f32,
}

impl HeadingSensor for SimGyro {
    fn angle(&mut self) -> f32 {
        self.world.borrow().heading - self.offset
    }

    fn drift(&mut self) -> f32 {
        self.world.borrow().gyro_drift
    }

    fn is_ready(&mut self) -> bool {
        self.world.borrow().gyro_ready
    }

    fn reset(&mut self) {
        self.offset = self.world.borrow().heading;
    }
}

pub struct SimClock {
    world: Shared,
}

impl Clock for SimClock {
    fn millis(&mut self) -> u64 {
        self.world.borrow().now_ms
    }

    fn pause(&mut self, ms: u32) {
        let mut w = self.world.borrow_mut();
        for _ in 0..ms {
            w.step_ms();
        }
        w.pauses += 1;
        if w.trip_after_pauses == Some(w.pauses) {
            w.latch.trip();
            w.commands_at_trip = Some(w.commands);
        }
    }
}

pub type SimHardware = Hardware<SimEncoder, SimEncoder, SimMotors, SimGyro, SimClock>;
pub type SimDrive = Drive<'static, SimEncoder, SimEncoder, SimMotors, SimGyro, SimClock>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A healthy robot at rest with its own stop latch.
pub fn sim() -> (SimHardware, Shared, &'static StopLatch) {
    init_logging();
    let latch: &'static StopLatch = Box::leak(Box::new(StopLatch::new()));
    let world = Rc::new(RefCell::new(World {
        left_deg: 0.0,
        right_deg: 0.0,
        heading: 0.0,
        left_power: 0.0,
        right_power: 0.0,
        brake: false,
        now_ms: 0,
        gyro_ready: true,
        gyro_drift: 0.0,
        commands: 0,
        pauses: 0,
        trip_after_pauses: None,
        commands_at_trip: None,
        latch,
    }));
    let hw = Hardware {
        left: SimEncoder {
            world: world.clone(),
            left: true,
            offset: 0.0,
        },
        right: SimEncoder {
            world: world.clone(),
            left: false,
            offset: 0.0,
        },
        motors: SimMotors {
            world: world.clone(),
        },
        gyro: SimGyro {
            world: world.clone(),
            offset: 0.0,
        },
        clock: SimClock {
            world: world.clone(),
        },
    };
    (hw, world, latch)
}

pub fn config() -> DriveConfig {
    DriveConfig::new(WHEEL_DIAMETER_CM, WHEEL_BASE_CM)
}

/// A set-up drive on a fresh simulated robot.
pub fn drive() -> (SimDrive, Shared) {
    let (hw, world, latch) = sim();
    let drive = match Drive::setup(hw, config(), latch) {
        Ok(drive) => drive,
        Err(e) => panic!("setup failed: {}", e),
    };
    (drive, world)
}

/// Lets the robot roll on its last command, like waiting on the brick.
pub fn wait(drive: &mut SimDrive, ms: u32) {
    drive.hardware_mut().clock.pause(ms);
}
