//! Subcommand implementations

pub mod analysis;
pub mod health;
pub mod pods;
