//! Interactive terminal chat for ChatGuru.
//!
//! One `SessionStore` lives on the loop's stack; each submitted line is one
//! turn against the model, rendered as markdown once the reply arrives.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
