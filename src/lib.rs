//! sioprobe - an interactive Socket.IO diagnostic client
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod event_log;
pub mod logging;
pub mod session;
pub mod socketio;
pub mod terminal;
pub mod traits;
pub mod ui;
