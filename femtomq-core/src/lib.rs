//! # femtomq-core
//!
//! Sans-I/O MQTT 3.1.1 client protocol core.
//!
//! This library contains the packet codec, the incremental session engine,
//! and the application-facing client API. It performs no I/O of its own:
//! the host feeds inbound bytes in, drains outbound byte buffers, and owns
//! the transport (TCP, TLS, serial, an in-process test harness).
//!
//! ## Features
//!
//! - **no_std** compatible - no standard library, no allocator
//! - **MQTT 3.1.1** compliant - all fourteen control packet types
//! - **Fixed memory** - two caller-provided scratch buffers, nothing else
//! - **Partial-input safe** - inbound bytes may arrive in arbitrary chunks
//! - **QoS 0/1/2 receive** - automatic acks and duplicate suppression
//!
//! ## Limitations
//!
//! - Client role only (no broker)
//! - No sender-side QoS 1/2 retransmit state
//! - No automatic reconnection
//! - No persistence of in-flight messages

#![no_std]

pub mod client;
pub mod error;
pub mod protocol;
pub mod session;
pub mod time;

// Convenience re-exports
pub use client::{ConnectOptions, MqttClient, PublishOptions};
pub use error::ClientError;
pub use session::{Event, FeedResult, Session};
pub use time::{Clock, DummyClock};

// Protocol re-exports
pub use protocol::packet_type::PacketType;
pub use protocol::qos::QoS;
pub use protocol::ProtocolError;
pub use protocol::packets::{Packet, *};
