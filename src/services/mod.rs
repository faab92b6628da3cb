//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! The three stores (`registry`, `drawing`, `palette`) know nothing about
//! sockets. `session` coordinates them and decides who hears about each
//! change; `transport` turns those decisions into channel sends.

pub mod drawing;
pub mod palette;
pub mod registry;
pub mod session;
pub mod transport;
