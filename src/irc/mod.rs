//! IRC protocol layer: frame parsing, outbound commands, transport and session.

pub mod command;
pub mod connection;
pub mod parser;
pub mod session;
