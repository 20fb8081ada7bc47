pub mod console_logger;
pub mod noop_logger;
pub mod simulated_robot;

pub use console_logger::*;
pub use noop_logger::*;
pub use simulated_robot::*;
