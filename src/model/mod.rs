pub mod backend;
pub mod gemini;
pub mod mock;
pub mod ollama;
