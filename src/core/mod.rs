//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Validated types: `RepoId`, `BranchName`
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
