//! Port traits (interfaces to external collaborators).

pub mod config_port;
pub mod store_port;
pub mod view_port;
