//! Client-side session management.
//!
//! [`SessionManager`] owns the authentication lifecycle for a front end: it
//! talks to the identity service through [`ApiClient`], keeps the issued token
//! in a [`TokenStore`] and publishes [`SessionState`] to subscribers.

pub mod api;
pub mod error;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use error::ClientError;
pub use session::{Outcome, SessionManager, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
