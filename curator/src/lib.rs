// Library interface for curator modules
// Lets the integration tests and the binary share the same code

pub mod backend;
pub mod llm;
pub mod news;
pub mod server;
pub mod views;
