//! HTTP boundary for push webhooks.
//!
//! Translates requests into [`PushSyncService`](crate::push_sync::services::PushSyncService)
//! calls and maps outcomes onto status codes: processed and ignored pushes are
//! `200`, malformed payloads `400`, unknown projects `404` and collaborator
//! failures `500`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::create_router;
pub use state::AppState;
