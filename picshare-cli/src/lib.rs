//! # PicShare CLI Library
//!
//! ## Modules
//!
//! - `config`: Configuration loading (file + environment)
//! - `commands`: Command-line definition and handlers

pub mod commands;
pub mod config;
