// Cytron MDD3A dual H-bridge, one channel per wheel.
// Each channel takes two PWM inputs: (duty, 0) forward, (0, duty) backward,
// (0, 0) brake.

use embedded_hal::PwmPin;

use crate::drivers::motor::WheelMotor;

pub const DUTY_PER_PERCENT: f32 = 24.0;

/*
Helper Function
input: -100 < float < 100
out: 0 < tuple: u16 < max_duty
Decription: converts float to tuple (_,0) or (0,_) depending sign of float
out is to be used as the parameter in set_duties
*/
pub fn convert_power_to_duty(mut f: f32, max_duty: u16) -> (u16, u16) {
    let mut dir = true;

    if f < 0.0 {
        dir = false;
        f = -1.0 * f;
    }

    let mut duty = (f * DUTY_PER_PERCENT) as u16; //truncate

    //even though it's okay to set duty greater than max_duty, just in case something bad happens
    if duty > max_duty {
        duty = max_duty;
    }

    if dir == true {
        return (duty, 0);
    } else {
        return (0, duty);
    }
}

pub struct MDD3A<X, Y> {
    pwm: (X, Y),
}

impl<X, Y> MDD3A<X, Y>
where
    X: PwmPin<Duty = u16>,
    Y: PwmPin<Duty = u16>,
{
    pub fn new(in1: (X, Y)) -> Self {
        Self { pwm: in1 }
    }

    pub fn set_duties(&mut self, (speedx, speedy): (u16, u16)) {
        self.pwm.0.set_duty(speedx);
        self.pwm.1.set_duty(speedy);
    }

    pub fn max_duty(&self) -> u16 {
        let x = self.pwm.0.get_max_duty();
        let y = self.pwm.1.get_max_duty();
        x.min(y)
    }
}

impl<X, Y> WheelMotor for MDD3A<X, Y>
where
    X: PwmPin<Duty = u16>,
    Y: PwmPin<Duty = u16>,
{
    fn start(&mut self) {
        self.pwm.0.enable();
        self.pwm.1.enable();
    }

    fn set_power(&mut self, power: f32) {
        let duties = convert_power_to_duty(power, self.max_duty());
        self.set_duties(duties);
    }

    fn brake(&mut self) {
        self.set_duties((0, 0));
    }
}
