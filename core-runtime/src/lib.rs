//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the sync engine and the CLI:
//! - Logging and tracing infrastructure
//! - Configuration loading (file + environment)
//! - Event bus system
//!
//! ## Overview
//!
//! Nothing in here knows how a sync is performed. The engine publishes
//! progress on the [`EventBus`](events::EventBus), reads its settings from
//! [`AppConfig`](config::AppConfig), and logs through `tracing`; the binary
//! wires the three together.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
