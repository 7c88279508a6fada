// ICM-20948 IMU driver, gyroscope only.
// Datasheet: https://invensense.tdk.com/wp-content/uploads/2021/10/DS-000189-ICM-20948-v1.5.pdf

pub use crate::drivers::imu::icm20948_constants::*;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;

// Error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParamError,
    SpiError,
    WrongID,
    CSError,
}

struct SpiWrapper<SPI, CS> {
    spi_bus: SPI,
    cs: CS,
}

impl<SPI, CS> SpiWrapper<SPI, CS>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
{
    fn transfer<'a>(&mut self, data: &'a mut [u8]) -> Result<&'a [u8], ErrorCode> {
        if let Err(_) = self.cs.set_low() {
            return Err(ErrorCode::CSError);
        }
        let res = self.spi_bus.transfer(data);
        if let Err(_) = self.cs.set_high() {
            return Err(ErrorCode::CSError);
        }
        match res {
            Ok(read_data) => Ok(&read_data[1..]),
            Err(_) => Err(ErrorCode::SpiError),
        }
    }
}

pub struct ICM20948<SPI, CS> {
    spi: SpiWrapper<SPI, CS>,
    curr_bank: u8,
    gyro_fss: GyroFullScaleSel,
}

impl<SPI, CS> ICM20948<SPI, CS>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
{
    pub fn new(spi_bus: SPI, cs: CS) -> Self {
        Self {
            spi: SpiWrapper { spi_bus, cs },
            curr_bank: 255,
            gyro_fss: GyroFullScaleSel::Dps250,
        }
    }

    pub fn init<D: DelayMs<u32>>(
        &mut self,
        gyro_fss_config: GyroFullScaleSel,
        gyro_dlpf_config: GyroDLPFSel,
        delay: &mut D,
    ) -> Result<(), ErrorCode> {
        self.check_id()?;
        self.sw_reset()?;
        delay.delay_ms(RESET_DELAY_MS);
        // the reset selects bank 0 behind our back
        self.curr_bank = 255;
        self.sleep(false)?;
        self.set_low_power(false)?;
        self.enable_gyro()?;
        self.config_gyro(gyro_fss_config, gyro_dlpf_config)?;
        Ok(())
    }

    /// Checks the WHO_AM_I register. This is the "sensor present" probe.
    pub fn check_id(&mut self) -> Result<(), ErrorCode> {
        self.set_bank(0)?;
        let whoami = self.read_byte(RegAddrBank0::WhoAmI as u8)?;
        if whoami != ICM_20948_WHO_AM_I {
            Err(ErrorCode::WrongID)
        } else {
            Ok(())
        }
    }

    // z-component of angular velocity in degrees per second
    pub fn read_gyro_z(&mut self) -> Result<f32, ErrorCode> {
        self.set_bank(0)?;
        let mut bytes = [RegAddrBank0::GyroZoutH as u8, 0, 0];
        let buf = self.read_bytes(&mut bytes[..])?;
        let raw = (((buf[0] as u16) << 8) | buf[1] as u16) as i16;
        Ok(self.get_gyro_dps(raw))
    }

    fn get_gyro_dps(&self, raw: i16) -> f32 {
        match self.gyro_fss {
            GyroFullScaleSel::Dps250 => (raw as f32) / GYRO_SENSITIVITY_SCALE_DPS250,
            GyroFullScaleSel::Dps500 => (raw as f32) / GYRO_SENSITIVITY_SCALE_DPS500,
            GyroFullScaleSel::Dps1000 => (raw as f32) / GYRO_SENSITIVITY_SCALE_DPS1000,
            GyroFullScaleSel::Dps2000 => (raw as f32) / GYRO_SENSITIVITY_SCALE_DPS2000,
        }
    }

    fn sw_reset(&mut self) -> Result<(), ErrorCode> {
        self.set_bank(0)?;
        let mut reg = self.read_byte(RegAddrBank0::PwrMgmt1 as u8)?;

        // Set DEVICE_RESET bit
        reg |= PwrMgmt1Bits::DeviceReset as u8;

        self.write_byte(RegAddrBank0::PwrMgmt1 as u8, reg)?;
        Ok(())
    }

    fn sleep(&mut self, sleep: bool) -> Result<(), ErrorCode> {
        self.set_bank(0)?;
        let mut reg = self.read_byte(RegAddrBank0::PwrMgmt1 as u8)?;

        // Set SLEEP bit
        if sleep {
            reg |= PwrMgmt1Bits::Sleep as u8;
        } else {
            reg &= !(PwrMgmt1Bits::Sleep as u8);
        }

        self.write_byte(RegAddrBank0::PwrMgmt1 as u8, reg)?;
        Ok(())
    }

    fn set_low_power(&mut self, enable: bool) -> Result<(), ErrorCode> {
        self.set_bank(0)?;
        let mut reg = self.read_byte(RegAddrBank0::PwrMgmt1 as u8)?;

        // Set LP_EN bit
        if enable {
            reg |= PwrMgmt1Bits::LPEnable as u8;
        } else {
            reg &= !(PwrMgmt1Bits::LPEnable as u8);
        }

        self.write_byte(RegAddrBank0::PwrMgmt1 as u8, reg)?;
        Ok(())
    }

    fn enable_gyro(&mut self) -> Result<(), ErrorCode> {
        self.set_bank(0)?;
        let mut reg = self.read_byte(RegAddrBank0::PwrMgmt2 as u8)?;
        reg &= !(PwrMgmt2Bits::DisableGyro as u8);
        self.write_byte(RegAddrBank0::PwrMgmt2 as u8, reg)
    }

    fn config_gyro(
        &mut self,
        fss_config: GyroFullScaleSel,
        dlpf_config: GyroDLPFSel,
    ) -> Result<(), ErrorCode> {
        self.set_bank(2)?;
        let mut config = self.read_byte(RegAddrBank2::GyroConfig1 as u8)?;

        // Configure DLPF
        if matches!(dlpf_config, GyroDLPFSel::Disable) {
            config &= !(GyroConfig1Bits::GyroFChoice as u8);
        } else {
            config &= !(GyroConfig1Bits::GyroDLPFCFG as u8);
            config |= ((dlpf_config as u8) << 3) | (GyroConfig1Bits::GyroFChoice as u8);
        }

        // Configure FS
        config &= !(GyroConfig1Bits::GyroFSSel as u8);
        config |= (fss_config as u8) << 1;

        self.write_byte(RegAddrBank2::GyroConfig1 as u8, config)?;
        // 1.1 kHz output rate
        self.write_byte(RegAddrBank2::GyroSmplrtDiv as u8, 0)?;
        self.gyro_fss = fss_config;
        Ok(())
    }

    fn set_bank(&mut self, bank: u8) -> Result<(), ErrorCode> {
        if bank > 3 {
            Err(ErrorCode::ParamError)
        } else if self.curr_bank == bank {
            Ok(())
        } else {
            self.write_byte(RegAddrGeneral::BankSel as u8, (bank << 4) & 0x30)?;
            self.curr_bank = bank;
            Ok(())
        }
    }

    fn write_byte(&mut self, reg: u8, data: u8) -> Result<(), ErrorCode> {
        let mut bytes = [reg, data];
        self.spi.transfer(&mut bytes[..])?;
        Ok(())
    }

    fn read_byte(&mut self, reg: u8) -> Result<u8, ErrorCode> {
        let mut bytes = [reg | 0x80, 0];
        let data = self.spi.transfer(&mut bytes[..])?;
        Ok(data[0])
    }

    fn read_bytes<'a>(&mut self, data: &'a mut [u8]) -> Result<&'a [u8], ErrorCode> {
        data[0] |= 0x80;
        return self.spi.transfer(data);
    }
}
