//! Helpers shared by the subcommands.

pub mod css;
pub mod exec;
