//! Session persistence for hrgate
//!
//! The conversation history the original UI kept in browser storage lives
//! here instead: a repository trait with memory and file backings, and a
//! `SessionBook` that owns the list invariants.

mod book;
mod file_store;
mod repository;

pub use book::{derive_title, SessionBook, SessionSummary};
pub use file_store::FileStore;
pub use repository::{MemoryStore, SessionRepository};
