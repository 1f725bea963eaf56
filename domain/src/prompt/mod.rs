//! Prompt templates for experts, the quality monitor and the moderator.

pub mod template;

pub use template::PromptTemplate;
