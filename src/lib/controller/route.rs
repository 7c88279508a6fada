use log::{info, warn};

use crate::controller::drive::Drive;
use crate::controller::profile::SegmentOutcome;
use crate::hardware::{Clock, HeadingSensor, TankDrive, WheelEncoder};

/// One segment of a fixed route, the arguments of
/// [`Drive::drive_segment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub distance_cm: f32,
    pub start_heading: f32,
    pub end_heading: f32,
    pub end_speed: Option<f32>,
}

impl Leg {
    pub const fn new(
        distance_cm: f32,
        start_heading: f32,
        end_heading: f32,
        end_speed: Option<f32>,
    ) -> Leg {
        Leg {
            distance_cm,
            start_heading,
            end_heading,
            end_speed,
        }
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
    /// Resets the robot, drives the legs back to back and brakes at the
    /// end. An interrupted or rejected leg abandons the rest of the route.
    pub fn drive_route(&mut self, legs: &[Leg]) -> SegmentOutcome {
        self.reset();
        let start = self.hw.clock.millis();

        for (i, leg) in legs.iter().enumerate() {
            let outcome = self.drive_segment(
                leg.distance_cm,
                leg.start_heading,
                leg.end_heading,
                leg.end_speed,
            );
            if outcome != SegmentOutcome::Completed {
                warn!("route stopped in leg {}: {:?}", i, outcome);
                self.motor_stop(true);
                return outcome;
            }
        }

        self.motor_stop(true);
        info!(
            "route of {} legs done in {} ms",
            legs.len(),
            self.hw.clock.millis().saturating_sub(start)
        );
        SegmentOutcome::Completed
    }
}
