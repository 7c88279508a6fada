use log::{debug, warn};

use crate::controller::drive::Drive;
use crate::controller::heading::HeadingController;
use crate::geometry;
use crate::hardware::{Clock, HeadingSensor, TankDrive, WheelEncoder};

/// How an in-place rotation ended. Running out of budget is not an error;
/// the robot simply keeps the heading it reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Convergence {
    Reached,
    BudgetExhausted { error: f32 },
    /// The stop latch tripped; the halt sequence was abandoned.
    Interrupted,
}

impl<'a, L, R, M, G, C> Drive<'a, L, R, M, G, C>
where
    L: WheelEncoder,
    R: WheelEncoder,
    M: TankDrive,
    G: HeadingSensor,
    C: Clock,
{
    /// Turns in place toward `target` with forward speed pinned at zero.
    ///
    /// With `halt`, a converged (or exhausted) rotation ends with a braked
    /// stop and a settle pause.
    pub fn rotate_to(&mut self, target: f32, halt: bool) -> Convergence {
        let tuning = self.config.tuning;

        if self.debug {
            let error = HeadingController::error(target, self.heading());
            debug!(
                "rotate W:{} wheel arc {} cm",
                target,
                geometry::turn_arc_cm(error, self.config.wheel_base_cm)
            );
        }

        let mut reached = false;
        let mut ticks = 0;
        while ticks < tuning.rotation_budget {
            if self.is_stopped() {
                return Convergence::Interrupted;
            }
            if HeadingController::error(target, self.heading()) <= tuning.heading_tolerance_deg {
                reached = true;
                break;
            }
            if !self.steer(target, Some(0.0), 100.0).sent {
                return Convergence::Interrupted;
            }
            ticks += 1;
        }
        if self.is_stopped() {
            return Convergence::Interrupted;
        }

        let outcome = if reached {
            Convergence::Reached
        } else {
            let error = HeadingController::error(target, self.heading());
            if error <= tuning.heading_tolerance_deg {
                Convergence::Reached
            } else {
                warn!("rotation to {} stopped {} deg short after {} ticks", target, error, ticks);
                Convergence::BudgetExhausted { error }
            }
        };

        if self.debug {
            debug!("rotate C:{}", ticks);
        }

        if halt {
            self.motor_stop(true);
            self.pause(tuning.rotation_settle_ms);
        }
        outcome
    }
}
