pub mod commands;
pub mod config;
pub mod git;
pub mod workflow;
