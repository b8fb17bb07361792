pub mod handlers;
pub mod input;
pub mod prompts;
pub mod ranking;
