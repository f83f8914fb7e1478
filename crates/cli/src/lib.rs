//! Command line client for the portal service.
//!
//! The binary is a thin shell over [`commands::dispatch`]; everything else is
//! exposed here so commands can be exercised against a scripted transport.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod settings_store;
