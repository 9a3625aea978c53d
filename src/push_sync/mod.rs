//! Commit-driven work item status synchronisation.
//!
//! A source-control push arrives as a webhook; each commit message is scanned
//! for task references (`TASK-12`) and status keywords (`TASK-12:#done`,
//! `#start`), the resolved status is gated by the branch the push targeted,
//! and permitted transitions are applied to the work item store. Every
//! processed push leaves exactly one activity log entry. The module follows
//! hexagonal architecture:
//!
//! - Domain types and the pure extraction/resolution/gating logic in
//!   [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The synchronisation engine in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
