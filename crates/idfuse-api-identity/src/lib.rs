//! Unified identity API for idfuse.
//!
//! This crate is the engine that maps many authentication credentials to one
//! universal identity:
//!
//! - **Provider resolution**: deriving the credential to register from an
//!   account's populated sign-in fields, in a fixed priority order
//! - **Binding management**: bind/unbind with global credential uniqueness
//!   and an at-least-one-credential floor per identity
//! - **Account merging**: a single-transaction protocol that transfers
//!   credentials, purges the losing account's dependent records across every
//!   owning subsystem, and deletes the account row
//! - **Unified login**: resolving a credential back to its owning account
//!
//! # Example
//!
//! ```rust,ignore
//! use idfuse_api_identity::{identity_router, IdentityConfig, IdentityState};
//!
//! let state = IdentityState::new(IdentityConfig { pool, token_verifier });
//! let app = Router::new().nest("/identity", identity_router().with_state(state));
//! ```

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod token;

pub use error::{IdentityError, IdentityResult};
pub use router::{identity_router, IdentityConfig, IdentityState};
pub use token::{JwtTokenVerifier, TokenVerifier};
