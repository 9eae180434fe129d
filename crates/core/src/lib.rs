#![forbid(unsafe_code)]

pub mod bank;
pub mod classifier;
pub mod keywords;
pub mod model;
pub mod study;
pub mod time;

pub use time::Clock;
