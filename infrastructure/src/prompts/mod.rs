//! Built-in prompt template library

pub mod library;

pub use library::PromptLibrary;
