use crate::protocol::packet_type::PacketType;
use crate::protocol::ProtocolError;

/// Engine-level error, surfaced to the host as an event.
///
/// None of these terminate the engine: a bad packet is dropped, the
/// framing pointer advances to the next packet boundary, and processing
/// continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientError {
    /// The host clock reported monotonic time as unavailable
    ClockUnavailable,
    /// Inbound packet body exceeds the inbound scratch capacity
    OutOfMemory { required: usize, capacity: usize },
    /// Packet codec error
    Protocol(ProtocolError),
    /// A packet kind a client never receives arrived from the broker
    UnhandledPacket { packet_type: PacketType },
}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClientError::ClockUnavailable => {
                write!(f, "Monotonic clock unavailable")
            }
            ClientError::OutOfMemory { required, capacity } => {
                write!(
                    f,
                    "Packet body of {} bytes exceeds inbound scratch of {} bytes",
                    required, capacity
                )
            }
            ClientError::Protocol(error) => {
                write!(f, "Protocol error: {}", error)
            }
            ClientError::UnhandledPacket { packet_type } => {
                write!(f, "Unhandled inbound packet type: {:?}", packet_type)
            }
        }
    }
}

impl core::error::Error for ClientError {}

impl From<ProtocolError> for ClientError {
    fn from(error: ProtocolError) -> Self {
        ClientError::Protocol(error)
    }
}
