pub mod heading;
pub mod icm20948;
pub mod icm20948_constants;
