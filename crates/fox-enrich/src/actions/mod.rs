//! Built-in actions.

mod log;

pub use log::LogAction;
