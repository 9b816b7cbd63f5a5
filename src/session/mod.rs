//! Session Storage
//!
//! Persistent storage for the access/refresh token pair that identifies the
//! signed-in user.
//!
//! - [`TokenStore`]: get/set/clear interface the API client depends on
//! - [`MemoryTokenStore`]: in-process store for tests and embedding
//! - [`FileTokenStore`]: JSON file used by the command-line client

mod error;
mod file;
mod store;

pub use error::{SessionError, SessionResult};
pub use file::{default_session_path, FileTokenStore};
pub use store::{MemoryTokenStore, TokenPair, TokenStore};
