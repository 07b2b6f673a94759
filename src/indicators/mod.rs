//! Pure indicator functions over candle sequences.
//!
//! Every function returns a documented neutral default when the history is
//! too short; none of them error.

pub mod math;
pub mod momentum;
pub mod snapshot;
pub mod structure;
pub mod trend;
pub mod volume;

pub use momentum::*;
pub use snapshot::analyze;
pub use structure::*;
pub use trend::*;
pub use volume::*;
