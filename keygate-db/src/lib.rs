//! SQLite storage for Keygate keys, device activations, user levels and
//! usage logs.
//!
//! The connection is opened once at startup and shared by every request.

mod error;
mod schema;
mod store;

pub use error::{DbError, DbResult};
pub use store::SqliteKeyStore;
