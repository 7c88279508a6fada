use libm::fabsf;
use log::{debug, info, warn};

use crate::controller::config::DriveConfig;
use crate::controller::drive::Drive;
use crate::geometry::Direction;
use crate::controller::rotation::Convergence;
use crate::hardware::{Clock, HeadingSensor, TankDrive, WheelEncoder};

/// Distance/heading profile of one segment, with speeds and distance as
/// magnitudes and the travel direction kept separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProfile {
    pub distance_cm: f32,
    pub start_speed: f32,
    pub end_speed: f32,
    pub start_heading: f32,
    pub end_heading: f32,
    pub direction: Direction,
}

/// What the profile asks for on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Drive {
        /// Speed magnitude, negative when correcting an overshoot.
        speed: f32,
        heading: f32,
        progress: f32,
    },
    Finished,
}

impl SegmentProfile {
    /// `distance_cm` and `end_speed` are signed; their sign product is the
    /// travel direction.
    pub fn new(
        distance_cm: f32,
        start_heading: f32,
        end_heading: f32,
        start_speed: f32,
        end_speed: f32,
    ) -> Self {
        Self {
            distance_cm: fabsf(distance_cm),
            start_speed: fabsf(start_speed),
            end_speed: fabsf(end_speed),
            start_heading,
            end_heading,
            direction: Direction::of(distance_cm) * Direction::of(end_speed),
        }
    }

    /// Keeps rolling at `current_speed`, in its direction of travel.
    /// From rest this is a segment ending at speed zero.
    pub fn continuing(
        distance_cm: f32,
        start_heading: f32,
        end_heading: f32,
        current_speed: f32,
    ) -> Self {
        if current_speed == 0.0 {
            return Self::new(distance_cm, start_heading, end_heading, 0.0, 0.0);
        }
        Self {
            distance_cm: fabsf(distance_cm),
            start_speed: fabsf(current_speed),
            end_speed: fabsf(current_speed),
            start_heading,
            end_heading,
            direction: Direction::of(current_speed),
        }
    }

    /// Share of the distance covered, 0..=100.
    pub fn progress_percent(&self, travelled: f32) -> f32 {
        if self.distance_cm <= 0.0 {
            return 100.0;
        }
        (fabsf(travelled) / self.distance_cm * 100.0).max(0.0).min(100.0)
    }

    pub fn speed_at(&self, progress: f32) -> f32 {
        self.start_speed + (self.end_speed - self.start_speed) * progress / 100.0
    }

    pub fn heading_at(&self, progress: f32) -> f32 {
        self.start_heading + (self.end_heading - self.start_heading) * progress / 100.0
    }

    /// Decides the next tick from the distance travelled along the
    /// direction of travel since the segment baseline.
    pub fn step(&self, config: &DriveConfig, travelled: f32) -> Step {
        let tuning = &config.tuning;
        let mut progress = self.progress_percent(travelled);
        let mut speed = self.speed_at(progress);

        if speed > config.cruise_threshold() {
            // hand over to the next segment without stopping
            if travelled >= self.distance_cm - tuning.cruise_band_cm {
                return Step::Finished;
            }
        } else {
            if fabsf(self.distance_cm - travelled) <= tuning.goal_band_cm {
                return Step::Finished;
            }
            if travelled > self.distance_cm {
                speed = -config.min_speed;
                progress = 100.0;
            }
        }

        Step::Drive {
            speed: config.fix_speed(speed, false),
            heading: self.heading_at(progress),
            progress,
        }
    }
}

/// How a segment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOutcome {
    Completed,
    /// The stop latch tripped mid-segment.
    Interrupted,
    /// A distance, heading or speed was not finite; nothing was sent.
    Rejected,
}

impl<'a, L, R, M, G, C> Drive<'a, L, R, M, G, C>
where
    L: WheelEncoder,
    R: WheelEncoder,
    M: TankDrive,
    G: HeadingSensor,
    C: Clock,
{
    /// Drives `distance_cm` while turning from `start_heading` to
    /// `end_heading` in step with the distance covered.
    ///
    /// The speed moves linearly from the current rolling speed to
    /// `end_speed` (`None` keeps the current speed and direction of travel). A segment with
    /// a non-zero end speed ends early so the next one continues without
    /// stopping; consecutive segments share one odometry target.
    pub fn drive_segment(
        &mut self,
        distance_cm: f32,
        start_heading: f32,
        end_heading: f32,
        end_speed: Option<f32>,
    ) -> SegmentOutcome {
        if self.is_stopped() {
            return SegmentOutcome::Interrupted;
        }
        let finite = distance_cm.is_finite()
            && start_heading.is_finite()
            && end_heading.is_finite()
            && end_speed.map_or(true, f32::is_finite);
        if !finite {
            warn!(
                "segment rejected: {} cm from {} to {} at {:?}",
                distance_cm, start_heading, end_heading, end_speed
            );
            return SegmentOutcome::Rejected;
        }

        let current = self.state.current_speed;
        let profile = match end_speed {
            Some(end_speed) => {
                SegmentProfile::new(distance_cm, start_heading, end_heading, current, end_speed)
            }
            None => SegmentProfile::continuing(distance_cm, start_heading, end_heading, current),
        };

        if fabsf(self.state.current_speed) <= self.config.min_speed
            && self.rotate_to(start_heading, false) == Convergence::Interrupted
        {
            return SegmentOutcome::Interrupted;
        }

        if self.state.current_speed == 0.0 {
            self.state.target_distance = self.distance();
        }
        let baseline = self.state.target_distance;
        self.state.target_distance += profile.direction * profile.distance_cm;

        info!(
            "segment {} cm from {} to {} at {} -> {}",
            profile.direction * profile.distance_cm,
            start_heading,
            end_heading,
            profile.start_speed,
            profile.end_speed
        );

        loop {
            if self.is_stopped() {
                return SegmentOutcome::Interrupted;
            }
            let travelled = profile.direction * (self.distance() - baseline);
            let (speed, heading, progress) = match profile.step(&self.config, travelled) {
                Step::Finished => break,
                Step::Drive {
                    speed,
                    heading,
                    progress,
                } => (speed, heading, progress),
            };

            let steered = self.steer(heading, Some(profile.direction * speed), progress);
            if steered.sent {
                self.state.current_speed = profile.direction * speed;
            }
            if self.is_stopped() {
                return SegmentOutcome::Interrupted;
            }

            if self.debug {
                debug!("segment P:{} %:{} V:{}", travelled, progress, speed);
            }
        }

        if fabsf(self.state.current_speed) <= self.config.min_speed
            && self.rotate_to(end_heading, false) == Convergence::Interrupted
        {
            return SegmentOutcome::Interrupted;
        }
        SegmentOutcome::Completed
    }
}
