//! Adapter implementations of push synchronisation ports.

pub mod memory;
pub mod postgres;
