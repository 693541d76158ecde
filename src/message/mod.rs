//! Prompt construction and candidate message sanitization.

pub mod prompt;
pub mod sanitize;

pub use prompt::build_prompt;
pub use sanitize::sanitize_messages;
