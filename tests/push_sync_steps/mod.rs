//! Step definitions for push synchronisation scenarios.

mod given;
mod then;
mod when;
pub mod world;
