//! CLI subcommands

pub mod export;
pub mod train;
