//! Reference AI implementations.

pub mod gemini;

pub use gemini::GeminiAI;
