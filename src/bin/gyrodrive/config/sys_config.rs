use gyrodrive::controller::wheels::WheelDirections;
use gyrodrive::controller::Direction;
use log::LevelFilter;

pub const SYSCLK_HZ: u32 = 48_000_000;
pub const SECONDS_PER_TICK: f32 = 0.001;
pub const SERIAL_BAUD: u32 = 115_200;
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

pub const PWM_FREQ_KHZ: u32 = 20;
pub const WHEEL_CONTROL_PERIOD_MS: u64 = 1;
pub const IMU_PERIOD_MS: u64 = 10;

pub const WHEEL_DIAMETER_CM: f32 = 4.4;
pub const WHEEL_BASE_CM: f32 = 10.2;
pub const ENCODER_COUNTS_PER_REV: f32 = 4200.0;
pub const MAX_WHEEL_SPEED_DPS: f32 = 1200.0;

pub const WHEEL_DIRECTIONS: WheelDirections = WheelDirections {
    left: Direction::Forward,
    right: Direction::Backward,
};
pub const MOTORS_FORWARD: bool = true;
pub const GYRO_DIRECTION: Direction = Direction::Forward;

// 1 s of bias samples and 1 s of drift samples at the IMU rate
pub const IMU_SMA_FILTER_SIZE: usize = 100;
pub const IMU_RATE_DEADBAND_DPS: f32 = 0.1;
pub const IMU_READY_TIMEOUT_MS: u64 = 5_000;

pub const BUTTON_DEBOUNCE_MS: u32 = 50;
pub const ROUTE_START_DELAY_MS: u32 = 2_000;
