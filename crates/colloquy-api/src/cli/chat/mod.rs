//! Interactive CLI chat experience for Colloquy.
//!
//! Text turns against a single conversation session with a welcome banner,
//! thinking spinners, slash commands and Ctrl+C cancellation. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
