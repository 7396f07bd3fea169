//! Infrastructure layer for ChatGuru.
//!
//! Contains the implementations of the ports defined in `chatguru-core`:
//! the OpenAI-compatible inference client, the `llama-server` process
//! supervisor, and the `config.toml` loader.

pub mod config;
pub mod llm;
