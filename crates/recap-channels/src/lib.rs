//! # recap-channels
//!
//! Chat platform integrations for Recap.

pub mod discord;
