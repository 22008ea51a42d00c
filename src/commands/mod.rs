//! Subcommand implementations for the `emolens` binary.

pub mod common;
pub mod config;
pub mod media;
pub mod text;
