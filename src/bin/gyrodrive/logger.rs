// log backend on the serial console that also carries panic output

use core::cell::RefCell;
use core::fmt::Write;
use core::pin::Pin;

use cortex_m::interrupt::{self, Mutex};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use panic_write::PanicHandler;
use stm32f4xx_hal::{pac::USART2, serial::Tx};

pub type SerialTx = Pin<PanicHandler<Tx<USART2>>>;

pub struct SerialLogger {
    tx: Mutex<RefCell<Option<SerialTx>>>,
}

static LOGGER: SerialLogger = SerialLogger {
    tx: Mutex::new(RefCell::new(None)),
};

pub fn init(tx: SerialTx, level: LevelFilter) -> Result<(), SetLoggerError> {
    interrupt::free(|cs| LOGGER.tx.borrow(cs).replace(Some(tx)));
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        interrupt::free(|cs| {
            if let Some(tx) = self.tx.borrow(cs).borrow_mut().as_mut() {
                // serial errors drop the line
                let _ = writeln!(tx, "[{}] {}\r", record.level(), record.args());
            }
        });
    }

    fn flush(&self) {}
}
