//! Plan generation from free-text questions.
//!
//! A [`PlanGenerator`] produces the untrusted plan mapping; validation and
//! evaluation happen in [`crate::plan`] and [`crate::engine`]. The bundled
//! [`OpenAiPlanner`] talks to any OpenAI-compatible chat-completions endpoint.

mod openai;
mod prompt;
mod traits;

pub use openai::{parse_plan, OpenAiPlanner};
pub use prompt::SYSTEM_PROMPT;
pub use traits::PlanGenerator;
