// Gemini-backed text generation for recipe, workout, and motivation advice.

pub mod advisor;
pub mod client;
pub mod prompt;
