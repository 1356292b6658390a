pub mod calibration;
pub mod distribution;
pub mod scenarios;
