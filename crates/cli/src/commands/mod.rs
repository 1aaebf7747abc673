//! CLI subcommands

pub mod models;
pub mod predict;
