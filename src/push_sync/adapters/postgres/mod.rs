//! `PostgreSQL` adapters for push synchronisation.

mod activity_log;
mod blocking;
mod models;
mod project;
mod schema;
mod work_item;

pub use activity_log::PostgresActivityLog;
pub use blocking::{PushSyncPgPool, build_pool};
pub use project::PostgresProjectDirectory;
pub use work_item::PostgresWorkItemStore;
