//! Port traits the domain talks to; adapters implement them.

pub mod config_port;
pub mod export_port;
