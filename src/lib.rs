//! LedLink firmware library.
//!
//! A wireless access point exposing a single-client TCP command socket
//! that drives a status indicator.  Exposes the pure-logic modules for
//! integration testing and the host simulation. All ESP-IDF-specific code
//! is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod pins;
pub mod runtime;

pub mod adapters;
pub mod drivers;
