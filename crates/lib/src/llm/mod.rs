//! Text-generation provider abstraction and the Gemini client.

mod gemini;

pub use gemini::{GeminiClient, GenerationConfig, ProviderError, TextGenerator};
