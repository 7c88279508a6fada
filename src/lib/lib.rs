//! Gyro-assisted motion control for a two-wheeled differential-drive robot.
//!
//! The [`controller::Drive`] context turns motion goals ("rotate to heading",
//! "drive N cm from heading A to heading B") into left/right wheel commands,
//! using averaged wheel encoders for distance and a gyro for absolute heading.
//! Hardware is consumed through the traits in [`hardware`]; the drivers in
//! [`drivers`] implement them for the STM32 firmware.

#![cfg_attr(not(test), no_std)]

pub mod controller;
pub mod drivers;
pub mod filtering;
pub mod geometry;
pub mod hardware;
