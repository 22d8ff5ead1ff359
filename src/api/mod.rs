//! API Module
//!
//! Plain functions over a `MonitorSession` for whatever front-end drives the
//! monitor (console loop today). Fallible commands return `Result<T, String>`.

pub mod commands;
