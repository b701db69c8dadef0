//! Domain models for the Tomato Ripeness Management Service

mod detection;
mod environment;
mod growth;
mod ripeness;

pub use detection::*;
pub use environment::*;
pub use growth::*;
pub use ripeness::*;
