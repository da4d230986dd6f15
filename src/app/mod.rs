//! Session lifecycle: transport events, the per-connection bot, and the
//! reconnect supervisor.

pub mod bot;
pub mod event;
pub mod supervisor;
