//! Structure indicators: support/resistance, Fibonacci levels

pub mod fibonacci;
pub mod support_resistance;

pub use fibonacci::*;
pub use support_resistance::*;
