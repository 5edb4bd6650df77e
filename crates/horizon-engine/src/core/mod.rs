pub mod easing;
pub mod metric;
pub mod rng;
pub mod schedule;
pub mod time;
