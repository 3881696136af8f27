// src/providers/mod.rs
pub mod gemini;
pub mod openai;
