//! CLI module for course-qa - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for asking questions,
//! interactive chat, and direct tool access.

pub mod commands;

pub use commands::Cli;
