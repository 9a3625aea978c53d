//! Commit-driven work item status synchronisation.
//!
//! Source-control push webhooks carry commit messages that reference work
//! items (`PROJ-42`) and status keywords (`#done`). This crate extracts those
//! references, resolves the keywords, filters them through a branch policy
//! and moves the referenced work items to their new status, recording every
//! processed push in a per-project activity log.
//!
//! # Architecture
//!
//! The core follows hexagonal architecture principles:
//!
//! - **Domain**: reference grammar, status table, branch policies and payload
//!   normalisation with no infrastructure dependencies
//! - **Ports**: work item store, project directory and activity log traits
//! - **Adapters**: in-memory and `PostgreSQL` implementations of the ports
//! - **Services**: the synchronisation engine orchestrating the ports
//!
//! # Modules
//!
//! - [`push_sync`]: the synchronisation core
//! - [`http`]: webhook and activity log endpoints
//! - [`config`]: layered daemon configuration
//! - [`telemetry`]: tracing subscriber installation

pub mod config;
pub mod http;
pub mod push_sync;
pub mod telemetry;
