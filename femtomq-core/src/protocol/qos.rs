use crate::protocol::ProtocolError;

#[repr(u8)]
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QoS {
    pub const fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(ProtocolError::InvalidQosLevel { level: value }),
        }
    }

    /// The will QoS occupies its own bit pair in the CONNECT flags and
    /// gets its own error kind.
    pub const fn from_will_bits(value: u8) -> Result<Self, ProtocolError> {
        match Self::from_u8(value) {
            Ok(qos) => Ok(qos),
            Err(_) => Err(ProtocolError::InvalidWillQos { level: value }),
        }
    }
}
