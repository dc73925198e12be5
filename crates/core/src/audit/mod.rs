//! Append-only audit log.
//!
//! Engines emit [`AuditEvent`]s through a cloneable [`AuditHandle`]; a
//! background [`AuditWriter`] persists them into an [`AuditStore`].

mod events;
mod handle;
mod jsonl;
mod sqlite;
mod store;
mod writer;

pub use events::*;
pub use handle::*;
pub use jsonl::*;
pub use sqlite::*;
pub use store::*;
pub use writer::*;
