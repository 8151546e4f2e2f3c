//! # femtomq-tokio
//!
//! Tokio host adapter for the femtomq MQTT client core.
//!
//! The core is sans-I/O; this crate supplies the missing pieces for a
//! tokio host: a monotonic [`StdClock`] and an async pump that moves
//! bytes between a stream and the engine.

mod connection;
mod time;

pub use connection::{drive, exchange};
pub use time::StdClock;

pub use femtomq_core::*;
