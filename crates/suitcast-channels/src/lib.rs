//! # suitcast-channels
//!
//! Chat transports for suitcast. Telegram is the only one.

pub mod telegram;
