//! Application core: pure domain logic, zero platform I/O.
//!
//! This module contains the rules for the LedLink device: the single-client
//! command state machine, command decoding, and station reporting.  All
//! interaction with sockets, GPIO and the radio happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable on the
//! host.

pub mod commands;
pub mod events;
pub mod monitor;
pub mod ports;
pub mod service;
