//! Capabilities the drive core consumes from its environment.
//!
//! The firmware implements these over the STM32 peripherals (see
//! [`crate::drivers`]); tests implement them with a simulated robot.

use core::sync::atomic::{AtomicBool, Ordering};

/// One wheel's rotation sensor.
pub trait WheelEncoder {
    /// Accumulated rotation since the last clear, in degrees.
    fn angle(&mut self) -> f32;

    fn clear_counts(&mut self);
}

/// Combined actuator view over both wheels.
///
/// `tank` must apply both powers as a single command so neither wheel
/// runs ahead of the other.
pub trait TankDrive {
    /// Powers in percent, -100..=100, positive is forward.
    fn tank(&mut self, left: f32, right: f32);

    fn stop(&mut self);

    /// Hold position (brake) instead of coasting when stopped.
    fn set_brake(&mut self, brake: bool);
}

/// Absolute heading sensor.
pub trait HeadingSensor {
    /// Current heading in degrees.
    fn angle(&mut self) -> f32;

    /// Drift measured while the robot stood still, in degrees.
    fn drift(&mut self) -> f32;

    fn is_ready(&mut self) -> bool;

    /// Re-zero the heading.
    fn reset(&mut self);
}

/// Monotonic millisecond clock with a cooperative pause.
///
/// `pause` is a suspension point: event handlers (the stop button) may run
/// while the controller waits here, but never in the middle of a tick.
pub trait Clock {
    fn millis(&mut self) -> u64;

    fn pause(&mut self, ms: u32);
}

/// Emergency-stop latch shared between the controller and whatever
/// handles the stop button.
///
/// While tripped no actuation is sent and running maneuvers return at the
/// next check.
pub struct StopLatch {
    tripped: AtomicBool,
}

impl StopLatch {
    pub const fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
        }
    }

    pub fn trip(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.tripped.store(false, Ordering::SeqCst);
    }

    pub fn set(&self, tripped: bool) {
        self.tripped.store(tripped, Ordering::SeqCst);
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}

impl Default for StopLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Bundle of the hardware a [`crate::controller::Drive`] owns.
pub struct Hardware<L, R, M, G, C> {
    pub left: L,
    pub right: R,
    pub motors: M,
    pub gyro: G,
    pub clock: C,
}
