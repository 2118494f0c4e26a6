//! CLI subcommands.

pub mod backend;
pub mod migrate;
pub mod voice;
