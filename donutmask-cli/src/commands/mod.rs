//! Command implementations.

pub mod common;
pub mod config;
pub mod mask;
