//! Filter plans: the fixed key schema, the field binding table and validation.

mod types;
mod validator;

pub use types::*;
pub use validator::validate_plan;
