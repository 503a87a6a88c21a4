//! modpublish - publish mod releases to a community catalog repository
//!
//! modpublish reads a mod package's manifest, renders the catalog entry for
//! it and delivers the entry to the catalog through the usual contribution
//! workflow: fork the catalog, push a release branch to the fork, commit the
//! entry, open a pull request. Running it again for the same release is safe.
//!
//! # Architecture
//!
//! The codebase is layered:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to publish)
//! - [`publish`] - Fork → Branch → Content → Pull request stages
//! - [`manifest`] - Manifest loading and catalog entry rendering
//! - [`package`] - Package download for content hashes
//! - [`forge`] - Hosting API abstraction (GitHub, plus an in-memory forge)
//! - [`core`] - Configuration and validated identifiers
//! - [`auth`] - Bearer token providers
//! - [`secrets`] - Secret storage abstraction
//! - [`ui`] - Terminal output
//!
//! # Guarantees
//!
//! 1. A run never opens a second pull request for a release that has one
//! 2. The release branch is reset to a known base before anything is written
//! 3. File writes carry the revision they replace, so concurrent changes are rejected
//! 4. Tokens never appear in output, errors or `Debug` renderings

pub mod auth;
pub mod cli;
pub mod core;
pub mod forge;
pub mod manifest;
pub mod package;
pub mod publish;
pub mod secrets;
pub mod ui;
