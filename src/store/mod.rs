//! Persistence layer — libSQL-backed thread history storage.

pub mod libsql_backend;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use traits::ThreadStore;
