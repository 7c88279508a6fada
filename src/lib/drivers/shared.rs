//! Lock-free channels between the sampling tasks and the control loop.
//!
//! Interrupt-driven tasks publish encoder angles and the integrated heading
//! and pick up the latest tank command; the controller, running in the
//! lowest-priority context, sees them through the capability traits.
//! Every value is a single 32-bit word, so each load or store is atomic on
//! Cortex-M without critical sections.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use libm::roundf;

use crate::controller::motor::MAX_POWER;
use crate::hardware::{HeadingSensor, TankDrive, WheelEncoder};

pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub const fn zero() -> Self {
        AtomicF32(AtomicU32::new(0))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release)
    }
}

/// Encoder angle published by the wheel task, read through an offset so
/// clearing never has to wait for the publisher.
pub struct SharedEncoder<'a> {
    published: &'a AtomicF32,
    offset: f32,
}

impl<'a> SharedEncoder<'a> {
    pub fn new(published: &'a AtomicF32) -> Self {
        Self {
            published,
            offset: 0.0,
        }
    }
}

impl WheelEncoder for SharedEncoder<'_> {
    fn angle(&mut self) -> f32 {
        self.published.load() - self.offset
    }

    fn clear_counts(&mut self) {
        self.offset = self.published.load();
    }
}

/// Both tank powers packed into one word as hundredths of a percent.
pub struct TankCommand {
    packed: AtomicU32,
    hold: AtomicBool,
}

impl TankCommand {
    pub const fn new() -> Self {
        Self {
            packed: AtomicU32::new(0),
            hold: AtomicBool::new(false),
        }
    }

    pub fn publish(&self, left: f32, right: f32) {
        self.packed.store(pack(left, right), Ordering::Release);
    }

    pub fn powers(&self) -> (f32, f32) {
        unpack(self.packed.load(Ordering::Acquire))
    }

    pub fn set_hold(&self, hold: bool) {
        self.hold.store(hold, Ordering::Release);
    }

    /// Brake requested and nothing commanded.
    pub fn is_holding(&self) -> bool {
        self.hold.load(Ordering::Acquire) && self.powers() == (0.0, 0.0)
    }
}

impl Default for TankCommand {
    fn default() -> Self {
        Self::new()
    }
}

fn to_hundredths(power: f32) -> u32 {
    if power.is_nan() {
        return 0;
    }
    roundf(power.max(-MAX_POWER).min(MAX_POWER) * 100.0) as i16 as u16 as u32
}

fn pack(left: f32, right: f32) -> u32 {
    (to_hundredths(left) << 16) | to_hundredths(right)
}

fn unpack(word: u32) -> (f32, f32) {
    let left = (word >> 16) as u16 as i16;
    let right = (word & 0xFFFF) as u16 as i16;
    (left as f32 / 100.0, right as f32 / 100.0)
}

pub struct SharedTank<'a> {
    command: &'a TankCommand,
}

impl<'a> SharedTank<'a> {
    pub fn new(command: &'a TankCommand) -> Self {
        Self { command }
    }
}

impl TankDrive for SharedTank<'_> {
    fn tank(&mut self, left: f32, right: f32) {
        self.command.publish(left, right);
    }

    fn stop(&mut self) {
        self.command.publish(0.0, 0.0);
    }

    fn set_brake(&mut self, brake: bool) {
        self.command.set_hold(brake);
    }
}

/// Heading integrated by the IMU task together with its health figures.
pub struct HeadingChannel {
    heading: AtomicF32,
    drift: AtomicF32,
    ready: AtomicBool,
}

impl HeadingChannel {
    pub const fn new() -> Self {
        Self {
            heading: AtomicF32::zero(),
            drift: AtomicF32::zero(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn publish(&self, heading: f32) {
        self.heading.store(heading);
    }

    /// Marks the sensor usable once its drift has been measured.
    pub fn publish_ready(&self, drift: f32) {
        self.drift.store(drift);
        self.ready.store(true, Ordering::Release);
    }
}

impl Default for HeadingChannel {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SharedHeading<'a> {
    channel: &'a HeadingChannel,
    offset: f32,
}

impl<'a> SharedHeading<'a> {
    pub fn new(channel: &'a HeadingChannel) -> Self {
        Self { channel, offset: 0.0 }
    }
}

impl HeadingSensor for SharedHeading<'_> {
    fn angle(&mut self) -> f32 {
        self.channel.heading.load() - self.offset
    }

    fn drift(&mut self) -> f32 {
        self.channel.drift.load()
    }

    fn is_ready(&mut self) -> bool {
        self.channel.ready.load(Ordering::Acquire)
    }

    fn reset(&mut self) {
        self.offset = self.channel.heading.load();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tank_command_survives_packing() {
        let command = TankCommand::new();
        let mut tank = SharedTank::new(&command);
        tank.tank(-37.25, 99.99);
        assert_eq!(command.powers(), (-37.25, 99.99));
        tank.tank(250.0, -250.0);
        assert_eq!(command.powers(), (100.0, -100.0));
    }

    #[test]
    fn hold_only_applies_to_zero_command() {
        let command = TankCommand::new();
        let mut tank = SharedTank::new(&command);
        tank.set_brake(true);
        tank.tank(10.0, 10.0);
        assert!(!command.is_holding());
        tank.stop();
        assert!(command.is_holding());
    }

    #[test]
    fn clearing_counts_rezeroes_reader_only() {
        let published = AtomicF32::zero();
        published.store(720.0);
        let mut enc = SharedEncoder::new(&published);
        assert_eq!(enc.angle(), 720.0);
        enc.clear_counts();
        assert_eq!(enc.angle(), 0.0);
        published.store(750.0);
        assert_eq!(enc.angle(), 30.0);
        assert_eq!(published.load(), 750.0);
    }

    #[test]
    fn heading_waits_for_ready() {
        let channel = HeadingChannel::new();
        let mut gyro = SharedHeading::new(&channel);
        assert!(!gyro.is_ready());
        channel.publish_ready(0.0005);
        channel.publish(12.0);
        assert!(gyro.is_ready());
        assert_eq!(gyro.drift(), 0.0005);
        gyro.reset();
        channel.publish(15.0);
        assert_eq!(gyro.angle(), 3.0);
    }
}
