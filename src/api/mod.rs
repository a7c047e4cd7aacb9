//! HTTP API for the Demografi service.
//!
//! JSON endpoints for asking questions, evaluating plans directly and
//! retrieving row descriptions, plus health and metrics.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
