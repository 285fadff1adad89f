pub mod audit;
pub mod calibrate;
pub mod score;
