//! CLI commands

pub mod delete;
pub mod health;
pub mod push;
