//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `SessionData` / `SessionStore`: the access/refresh credential pair and
//!   role, persisted as a single atomically-written record
//! - `SessionState`: the session lifecycle state machine
//! - `claims`: role extraction from the access token payload
//! - `CredentialStore`: secure OS-level credential storage via keyring

pub mod claims;
pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Role, SessionData, SessionState, SessionStore};
