#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer too small for the encoded packet
    BufferTooSmall { buffer_size: usize },
    /// SUBSCRIBE carried no topic filters
    EmptyTopics,
    /// UNSUBSCRIBE carried no topic filters
    EmptyTopicFilters,
    /// Incomplete packet (not enough data)
    IncompletePacket { available: usize },
    /// Invalid connect flags in CONNECT
    InvalidConnectFlags { flags: u8 },
    /// Invalid connect return code in CONNACK
    InvalidConnectReturnCode { return_code: u8 },
    /// Remaining length exceeds the 268,435,455 byte limit or uses more
    /// than four encoded bytes
    InvalidLengthEncoding,
    /// Invalid packet type
    InvalidPacketType { packet_type: u8 },
    /// Invalid protocol name in CONNECT
    InvalidProtocolName,
    /// Invalid QoS level
    InvalidQosLevel { level: u8 },
    /// Invalid subscribe return code in SUBACK
    InvalidReturnCode { code: u8 },
    /// Invalid session present flag in CONNACK
    InvalidSessionPresentFlag { flag: u8 },
    /// Invalid will QoS bits in the CONNECT flags
    InvalidWillQos { level: u8 },
    /// Missing Packet Identifier where one is required
    MissingPacketId,
    /// MQTT string longer than its 16-bit length prefix allows
    StringTooLong { length: usize },
    /// Unsupported protocol level in CONNECT
    UnsupportedProtocolLevel { level: u8 },
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::BufferTooSmall { buffer_size } => {
                write!(f, "Buffer too small for packet: size {}", buffer_size)
            }
            ProtocolError::EmptyTopics => {
                write!(f, "SUBSCRIBE packet carries no topic filters")
            }
            ProtocolError::EmptyTopicFilters => {
                write!(f, "UNSUBSCRIBE packet carries no topic filters")
            }
            ProtocolError::IncompletePacket { available } => {
                write!(f, "Incomplete packet: available {}", available)
            }
            ProtocolError::InvalidConnectFlags { flags } => {
                write!(f, "Invalid connect flags in CONNECT packet: {}", flags)
            }
            ProtocolError::InvalidConnectReturnCode { return_code } => {
                write!(f, "Invalid connect return code in CONNACK: {}", return_code)
            }
            ProtocolError::InvalidLengthEncoding => {
                write!(f, "Invalid remaining length encoding")
            }
            ProtocolError::InvalidPacketType { packet_type } => {
                write!(f, "Invalid packet type: {}", packet_type)
            }
            ProtocolError::InvalidProtocolName => {
                write!(f, "Invalid protocol name in CONNECT packet")
            }
            ProtocolError::InvalidQosLevel { level } => {
                write!(f, "Invalid QoS level: {}", level)
            }
            ProtocolError::InvalidReturnCode { code } => {
                write!(f, "Invalid subscribe return code in SUBACK: {}", code)
            }
            ProtocolError::InvalidSessionPresentFlag { flag } => {
                write!(f, "Invalid session present flag in CONNACK packet: {}", flag)
            }
            ProtocolError::InvalidWillQos { level } => {
                write!(f, "Invalid will QoS level in CONNECT packet: {}", level)
            }
            ProtocolError::MissingPacketId => {
                write!(f, "Missing Packet Identifier where one is required")
            }
            ProtocolError::StringTooLong { length } => {
                write!(f, "String of {} bytes exceeds the 65,535 byte limit", length)
            }
            ProtocolError::UnsupportedProtocolLevel { level } => {
                write!(f, "Unsupported protocol level in CONNECT packet: {}", level)
            }
        }
    }
}

impl core::error::Error for ProtocolError {}
