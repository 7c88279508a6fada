use cortex_m::asm;
use gyrodrive::hardware::Clock;
use systick_monotonic::fugit::Duration;

use crate::app::monotonics;

/// Millisecond clock on the SysTick monotonic. Pausing sleeps the core
/// between interrupts; SysTick wakes it every millisecond and the sampling
/// tasks and the stop button run in between.
pub struct MonoClock;

impl Clock for MonoClock {
    fn millis(&mut self) -> u64 {
        monotonics::now().ticks()
    }

    fn pause(&mut self, ms: u32) {
        let end = monotonics::now() + Duration::<u64, 1, 1000>::millis(ms as u64);
        while monotonics::now() < end {
            asm::wfi();
        }
    }
}
