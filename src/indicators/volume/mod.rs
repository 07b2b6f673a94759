//! Volume indicators

pub mod confirmation;

pub use confirmation::*;
