pub mod email;
pub mod gemini;
pub mod prompts;
pub mod queue;
pub mod templates;
pub mod youtube;
