//! Loadtest command handlers.
//!
//! This module contains handlers for the send and monitor commands.

pub mod logging;
pub mod monitor;
pub mod output;
pub mod send;
pub mod shutdown;

pub use logging::mask_connection_password;
pub use monitor::run_monitor;
pub use send::run_send;
