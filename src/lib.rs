//! # catbot-rs
//!
//! Per-turn conversational memory and context synthesis for catbot
//! characters.
//!
//! Each chat turn reads the user's relationship memory and open threads
//! (Postgres via sqlx), fuses them with the turn's emotional read into a
//! system prompt, calls the completion service (rig-core), and afterwards
//! merges what it learned back into memory on a background worker.

pub mod character;
pub mod chat;
pub mod config;
pub mod db;
pub mod emotion;
pub mod error;
pub mod extract;
pub mod insight;
pub mod llm;
pub mod memory;
pub mod model;
pub mod prompt;
pub mod server;
pub mod telemetry;
pub mod thought;
