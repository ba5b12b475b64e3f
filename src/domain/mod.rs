// Domain layer - Sensor samples, visible ranges and chart read models
pub mod chart;
pub mod range;
pub mod sample;
