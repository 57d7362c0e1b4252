//! CLI Commands

pub mod check;
pub mod config;
pub mod serve;

pub use check::CheckCommand;
pub use config::ConfigCommand;
pub use serve::ServeCommand;
