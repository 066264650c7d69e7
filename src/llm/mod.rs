//! Text-generation client abstraction
//!
//! This module provides a trait-based abstraction for the text-generation
//! collaborator, allowing different backends (GenAI providers, mocks) to be
//! used interchangeably. Every request carries one of a fixed set of prompt
//! templates; callers never hand-assemble raw prompts.

mod client;
mod error;
mod genai;
mod mock;
mod prompt;

pub use client::{GenerationRequest, MessageRole, TextGenClient};
pub use error::GenerationError;
pub use genai::{GenAiClient, Provider};
pub use mock::{MockGenResponse, MockTextGenClient};
pub use prompt::{PromptBuilder, PromptTemplate};
