//! Dataset snapshot, schema and CSV loading.

mod loader;
mod normalize;
mod schema;
mod snapshot;

pub use loader::DatasetLoader;
pub use normalize::{is_missing, normalize, NO_DATA};
pub use schema::Column;
pub use snapshot::{format_number, DatasetSnapshot, Record};
