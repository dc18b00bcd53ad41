//! `coffeeshop-auth`: bearer token verification and permission checks.
//!
//! This crate is intentionally decoupled from HTTP and storage: it parses
//! header values, verifies tokens against an in-memory key set, and answers
//! permission questions. Fetching the key set is an infrastructure concern.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod header;
pub mod permissions;
pub mod verifier;

pub use authorize::authorize;
pub use claims::TokenPayload;
pub use error::AuthError;
pub use header::bearer_token;
pub use jsonwebtoken::jwk::JwkSet;
pub use permissions::Permission;
pub use verifier::{JwksVerifier, TokenVerifier};
