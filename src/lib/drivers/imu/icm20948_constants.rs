// ICM-20948 Registers and Configs (gyro subset)

#[repr(u8)]
pub enum RegAddrGeneral {
    BankSel = 0x7F,
}

#[repr(u8)]
pub enum RegAddrBank0 {
    WhoAmI = 0x00,
    PwrMgmt1 = 0x06,
    PwrMgmt2 = 0x07,
    GyroZoutH = 0x37,
}

#[repr(u8)]
pub enum RegAddrBank2 {
    GyroSmplrtDiv = 0x00,
    GyroConfig1 = 0x01,
}

// PwrMgmt1 register:
// Bits:     |       7      |   6   |   5   |     4    |     3    |   2:0  |
// Function: | DEVICE_RESET | SLEEP | LP_EN | reserved | TEMP_DIS | CLKSEL |
#[repr(u8)]
#[allow(dead_code)]
pub enum PwrMgmt1Bits {
    ClkSel = 0x07 << 0,
    TempDis = 0x01 << 3,
    LPEnable = 0x01 << 5,
    Sleep = 0x01 << 6,
    DeviceReset = 0x01 << 7,
}

// PwrMgmt2 register:
// Bits:     | 7:6      |    5:3    |    2:0   |
// Function: | reserved | DISABLE_A | DISABLE_G |
#[repr(u8)]
#[allow(dead_code)]
pub enum PwrMgmt2Bits {
    DisableGyro = 0x07 << 0,
    DisableAccel = 0x07 << 3,
}

// GyroConfig1 register:
// Bits:     |    7:6   |      5:3     |     2:1     |       0      |
// Function: | reserved | GYRO_DLPFCFG | GYRO_FS_SEL | GYRO_FCHOICE |
#[repr(u8)]
#[allow(dead_code)]
pub enum GyroConfig1Bits {
    GyroFChoice = 0x01 << 0,
    GyroFSSel = 0x03 << 1,
    GyroDLPFCFG = 0x07 << 3,
}

// Gyro full scale range in degrees per second
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GyroFullScaleSel {
    Dps250 = 0x00,
    Dps500 = 0x01,
    Dps1000 = 0x02,
    Dps2000 = 0x03,
}

// Gyro digital low pass filter config
// Format is dAbwB_nXbwY - A is integer part of 3db BW, B is fraction. X is integer part of nyquist bandwidth, Y is fraction
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GyroDLPFSel {
    D196bw6N229bw8 = 0x00,
    D151bw8N187bw6 = 0x01,
    D119bw5N154bw3 = 0x02,
    D51bw2N73bw3 = 0x03,
    D23bw9N35bw9 = 0x04,
    D11bw6N17bw8 = 0x05,
    D5bw7N8bw9 = 0x06,
    D361bw4N376bw5 = 0x07,
    Disable = 0xFF,
}

// Constants
pub const ICM_20948_WHO_AM_I: u8 = 0xEA;
pub const RESET_DELAY_MS: u32 = 10;

pub const GYRO_SENSITIVITY_SCALE_DPS250: f32 = 131.0;
pub const GYRO_SENSITIVITY_SCALE_DPS500: f32 = 65.5;
pub const GYRO_SENSITIVITY_SCALE_DPS1000: f32 = 32.8;
pub const GYRO_SENSITIVITY_SCALE_DPS2000: f32 = 16.4;
