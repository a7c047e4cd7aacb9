//! Configuration for the Demografi service.

mod settings;

pub use settings::*;
