//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements                          | Connects to                 |
//! |-----------------|-------------------------------------|-----------------------------|
//! | `access_point`  | StationTable                        | ESP-IDF soft-AP / simulation|
//! |                 | (radio events → NotificationBus)    |                             |
//! | `log_sink`      | EventSink                           | Serial log output           |
//! | `tcp`           | SocketFactory, Listener, Connection | lwIP sockets / `std::net`   |

pub mod access_point;
pub mod log_sink;
pub mod tcp;
