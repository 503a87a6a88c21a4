//! forge
//!
//! Abstraction over the remote hosting service.
//!
//! # Architecture
//!
//! The [`Forge`] trait is the only way the publish stages reach the hosting
//! API. Each method maps to a single remote request, so stages can decide
//! for themselves how to treat NotFound, Conflict and friends.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub REST implementation
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use modpublish::forge::{github::GitHubForge, Forge};
//!
//! let forge = GitHubForge::new(token_provider);
//! let me = forge.current_user().await?;
//! println!("acting as {}", me.login);
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
