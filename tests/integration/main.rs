//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against scripted sockets or the simulated access point.  All tests run
//! on the host with no real radio required.

#![cfg(not(target_os = "espidf"))]

mod log_tests;
mod mock_net;
mod runtime_tests;
