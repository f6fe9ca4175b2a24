pub mod math;
pub mod services;
