//! # recap-core
//!
//! Core types, traits, configuration, and error handling for the Recap digest bot.

pub mod channel_ids;
pub mod config;
pub mod error;
pub mod message;
pub mod traits;
pub mod window;
