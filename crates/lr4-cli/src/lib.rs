//! Litter box monitor CLI library.
//!
//! Wires the pure daily review in `lr4-core` to the real cloud,
//! filesystem, and messaging collaborators.

mod cli;
pub mod commands;
mod config;
pub mod pipeline;

pub use cli::{Cli, Commands};
pub use config::Config;
