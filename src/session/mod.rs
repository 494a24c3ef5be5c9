//! Per-browser sessions
//!
//! A session is a signed cookie naming a private directory under the
//! storage base. There is no server-side session registry; the directory
//! and its mtime are the whole record.

mod layer;
mod store;
mod token;

pub use layer::{session_layer, SESSION_COOKIE};
pub use store::{Session, SessionDir, SessionStore};
pub use token::{SessionSigner, SessionToken};
