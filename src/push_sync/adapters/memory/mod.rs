//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! tests and for running the daemon without a database.

mod activity_log;
mod project;
mod work_item;

pub use activity_log::InMemoryActivityLog;
pub use project::InMemoryProjectDirectory;
pub use work_item::InMemoryWorkItemStore;
