use crate::protocol::packets::PacketBody;
use crate::protocol::qos::QoS;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

pub const MQTT_PROTOCOL_NAME: &[u8] = b"MQTT";
pub const MQTT_3_1_1_PROTOCOL_LEVEL: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ConnectFlags(u8);

impl ConnectFlags {
    pub const RESERVED: Self = Self(0b_0000_0001);
    pub const CLEAN_SESSION: Self = Self(0b_0000_0010);
    pub const WILL_FLAG: Self = Self(0b_0000_0100);
    pub const WILL_QOS_1: Self = Self(0b_0000_1000);
    pub const WILL_QOS_2: Self = Self(0b_0001_0000);
    pub const WILL_RETAIN: Self = Self(0b_0010_0000);
    pub const PASSWORD: Self = Self(0b_0100_0000);
    pub const USERNAME: Self = Self(0b_1000_0000);

    pub const fn empty() -> Self {
        Self(0)
    }
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }
    pub const fn bits(self) -> u8 {
        self.0
    }
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Message the broker publishes on the client's behalf if it disconnects
/// unexpectedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Will<'a> {
    pub topic: &'a [u8],
    pub message: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

/// Fixed Header
///   byte 1:  0x10                      (type=1, flags=0000)
///   bytes :  Remaining Length (var-int)
///
/// Variable Header
///   Protocol Name      ("MQTT" as UTF-8 string)
///   Protocol Level     (0x04 for MQTT 3.1.1)
///   Connect Flags      (bitfield)
///   Keep Alive         (2 bytes)
///
/// Payload (order matters, some fields optional)
///   Client Identifier  (UTF-8 string)
///   Will Topic         (UTF-8 string)   [if Will Flag = 1]
///   Will Payload       (binary data)    [if Will Flag = 1]
///   User Name          (UTF-8 string)   [if User Name Flag = 1]
///   Password           (binary data)    [if Password Flag = 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connect<'a> {
    pub clean_session: bool,
    pub keep_alive: u16,
    pub client_id: &'a [u8],
    pub will: Option<Will<'a>>,
    pub username: Option<&'a [u8]>,
    pub password: Option<&'a [u8]>,
}

impl<'a> Connect<'a> {
    fn connect_flags(&self) -> ConnectFlags {
        let mut flags = ConnectFlags::empty();
        if self.clean_session {
            flags.insert(ConnectFlags::CLEAN_SESSION);
        }
        if let Some(will) = &self.will {
            flags.insert(ConnectFlags::WILL_FLAG);
            match will.qos {
                QoS::AtMostOnce => {}
                QoS::AtLeastOnce => flags.insert(ConnectFlags::WILL_QOS_1),
                QoS::ExactlyOnce => flags.insert(ConnectFlags::WILL_QOS_2),
            }
            if will.retain {
                flags.insert(ConnectFlags::WILL_RETAIN);
            }
        }
        if self.username.is_some() {
            flags.insert(ConnectFlags::USERNAME);
        }
        if self.password.is_some() {
            flags.insert(ConnectFlags::PASSWORD);
        }
        flags
    }

    pub fn decode(_flags: u8, body: &'a [u8]) -> Result<Self, ProtocolError> {
        let mut reader = ByteReader::new(body);

        let protocol_name = reader.take_string()?;
        if protocol_name != MQTT_PROTOCOL_NAME {
            return Err(ProtocolError::InvalidProtocolName);
        }

        let protocol_level = reader.take_u8()?;
        if protocol_level != MQTT_3_1_1_PROTOCOL_LEVEL {
            return Err(ProtocolError::UnsupportedProtocolLevel {
                level: protocol_level,
            });
        }

        let connect_flags = ConnectFlags::from_bits(reader.take_u8()?);
        // MQTT 3.1.1: bit 0 of the connect flags is reserved and must be 0
        if connect_flags.contains(ConnectFlags::RESERVED) {
            return Err(ProtocolError::InvalidConnectFlags {
                flags: connect_flags.bits(),
            });
        }
        let clean_session = connect_flags.contains(ConnectFlags::CLEAN_SESSION);

        let keep_alive = reader.take_u16()?;
        let client_id = reader.take_string()?;

        let will = if connect_flags.contains(ConnectFlags::WILL_FLAG) {
            let qos = QoS::from_will_bits((connect_flags.bits() >> 3) & 0b11)?;
            let topic = reader.take_string()?;
            let message = reader.take_string()?;
            Some(Will {
                topic,
                message,
                qos,
                retain: connect_flags.contains(ConnectFlags::WILL_RETAIN),
            })
        } else {
            None
        };

        let username = if connect_flags.contains(ConnectFlags::USERNAME) {
            Some(reader.take_string()?)
        } else {
            None
        };

        let password = if connect_flags.contains(ConnectFlags::PASSWORD) {
            Some(reader.take_string()?)
        } else {
            None
        };

        Ok(Self {
            clean_session,
            keep_alive,
            client_id,
            will,
            username,
            password,
        })
    }
}

impl PacketBody for Connect<'_> {
    fn body_len(&self) -> usize {
        let mut remaining_length = 0;
        remaining_length += 2 + MQTT_PROTOCOL_NAME.len(); // Protocol Name
        remaining_length += 1; // Protocol Level
        remaining_length += 1; // Connect Flags
        remaining_length += 2; // Keep Alive
        remaining_length += 2 + self.client_id.len(); // Client ID
        if let Some(will) = &self.will {
            remaining_length += 2 + will.topic.len();
            remaining_length += 2 + will.message.len();
        }
        if let Some(username) = &self.username {
            remaining_length += 2 + username.len();
        }
        if let Some(password) = &self.password {
            remaining_length += 2 + password.len();
        }
        remaining_length
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        // variable header
        writer.put_string(MQTT_PROTOCOL_NAME)?;
        writer.put_u8(MQTT_3_1_1_PROTOCOL_LEVEL)?;
        writer.put_u8(self.connect_flags().bits())?;
        writer.put_u16(self.keep_alive)?;

        // payload
        writer.put_string(self.client_id)?;
        if let Some(will) = &self.will {
            writer.put_string(will.topic)?;
            writer.put_string(will.message)?;
        }
        if let Some(username) = &self.username {
            writer.put_string(username)?;
        }
        if let Some(password) = &self.password {
            writer.put_string(password)?;
        }
        Ok(())
    }
}
