//! Core domain + application logic for the device monitor.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind the
//! `MessagingPort` trait implemented in the adapter crate.

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod file_logger;
pub mod logging;
pub mod messaging;
pub mod monitor;
pub mod notifier;
pub mod stop_signal;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
