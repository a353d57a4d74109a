pub mod args;
pub mod unit;
pub mod waves;
