//! Outbound messaging abstraction (Telegram is the only adapter today).

pub mod port;
