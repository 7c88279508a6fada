pub mod exponential;
pub mod sma;
