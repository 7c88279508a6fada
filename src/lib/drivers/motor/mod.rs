pub mod mdd3a;

/// A single motor channel driven by signed power.
pub trait WheelMotor {
    fn start(&mut self);

    /// Power in percent, -100..=100.
    fn set_power(&mut self, power: f32);

    /// Short both motor terminals.
    fn brake(&mut self);
}
