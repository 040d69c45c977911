//! virl-packet: provision, poll, and tear down VIRL servers on Packet.
//!
//! One REST call per command, except `status`, which polls device events
//! until the deployment succeeds.

pub mod api;
pub mod cli;
pub mod core;
pub mod poller;
