//! Sea-router CLI library.
//!
//! Formatting helpers shared by the `searouter-cli` subcommands.

pub mod output;
