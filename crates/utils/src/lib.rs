pub mod frame;
pub mod logs;
