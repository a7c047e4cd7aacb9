//! Semantic retrieval over row descriptions.

mod index;
mod retriever;

pub use index::{FlatIndex, IndexHit};
pub use retriever::{fingerprint, ContextRetriever};
