use crate::protocol::packets::PacketBody;
use crate::protocol::qos::QoS;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct PublishFlags {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
}

impl PublishFlags {
    pub const fn to_nibble(self) -> u8 {
        let dup = if self.dup { 1u8 } else { 0u8 };
        let retain = if self.retain { 1u8 } else { 0u8 };
        (dup << 3) | ((self.qos as u8) << 1) | retain
    }

    pub fn from_nibble(nibble: u8) -> Result<Self, ProtocolError> {
        let qos = QoS::from_u8((nibble >> 1) & 0b11)?;
        Ok(PublishFlags {
            dup: (nibble & 0b1000) != 0,
            qos,
            retain: (nibble & 0b0001) != 0,
        })
    }
}

/// Topic and payload borrow the inbound scratch on the decode path; they
/// stay valid until the next `feed` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publish<'a> {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    pub topic: &'a [u8],
    pub packet_id: Option<u16>,
    pub payload: &'a [u8],
}

impl<'a> Publish<'a> {
    pub(crate) fn flags_nibble(&self) -> u8 {
        PublishFlags {
            dup: self.dup,
            qos: self.qos,
            retain: self.retain,
        }
        .to_nibble()
    }

    pub fn decode(flags: u8, body: &'a [u8]) -> Result<Self, ProtocolError> {
        let publish_flags = PublishFlags::from_nibble(flags & 0x0F)?;
        let mut reader = ByteReader::new(body);

        let topic = reader.take_string()?;

        let packet_id = if publish_flags.qos != QoS::AtMostOnce {
            let pid = reader.take_u16()?;
            if pid == 0 {
                return Err(ProtocolError::MissingPacketId);
            }
            Some(pid)
        } else {
            None
        };

        let payload = reader.take_rest();

        Ok(Self {
            dup: publish_flags.dup,
            qos: publish_flags.qos,
            retain: publish_flags.retain,
            topic,
            packet_id,
            payload,
        })
    }
}

impl PacketBody for Publish<'_> {
    fn body_len(&self) -> usize {
        let mut remaining_length = 2 + self.topic.len();
        if self.qos != QoS::AtMostOnce {
            remaining_length += 2;
        }
        remaining_length + self.payload.len()
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_string(self.topic)?;
        if self.qos != QoS::AtMostOnce {
            let pid = self.packet_id.ok_or(ProtocolError::MissingPacketId)?;
            writer.put_u16(pid)?;
        }
        writer.put_bytes(self.payload)
    }
}

impl core::fmt::Display for Publish<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Publish {{ topic: {} bytes, packet_id: {:?}, qos: {:?}, dup: {}, retain: {}, payload: {} bytes }}",
            self.topic.len(),
            self.packet_id,
            self.qos,
            self.dup,
            self.retain,
            self.payload.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::Packet;

    fn roundtrip_test(bytes: &[u8]) -> Publish<'_> {
        let packet = match Packet::decode(bytes) {
            Ok(Packet::Publish(publish)) => publish,
            other => panic!("expected PUBLISH, got {:?}", other),
        };
        let mut buffer = [0u8; 256];
        let encode_result = Packet::Publish(packet).encode(&mut buffer);
        assert!(encode_result.is_ok(), "Failed to encode packet: {:?}", encode_result.err());
        let encoded_size = encode_result.unwrap();
        assert_eq!(encoded_size, bytes.len(), "Encoded size mismatch");
        assert_eq!(&buffer[..encoded_size], bytes, "Encoded bytes mismatch");
        packet
    }

    #[test]
    fn test_qos0_minimal_packet() {
        let packet = roundtrip_test(&[0x30, 0x03, 0x00, 0x01, 0x61]);
        assert_eq!(packet.topic, b"a");
        assert_eq!(packet.qos, QoS::AtMostOnce);
        assert!(!packet.dup);
        assert!(!packet.retain);
        assert_eq!(packet.packet_id, None);
        assert_eq!(packet.payload, b"");
    }

    #[test]
    fn test_qos0_with_payload() {
        let bytes: &[u8] = &[
            0x30, 0x12, 0x00, 0x0B, 0x73, 0x65, 0x6E, 0x73, 0x6F, 0x72, 0x2F, 0x74, 0x65, 0x6D,
            0x70, 0x68, 0x65, 0x6C, 0x6C, 0x6F,
        ];
        let packet = roundtrip_test(bytes);
        assert_eq!(packet.topic, b"sensor/temp");
        assert_eq!(packet.payload, b"hello");
    }

    #[test]
    fn test_qos1_foo_bar_pid_42() {
        let bytes: &[u8] = &[
            0x32, 0x0E, 0x00, 0x07, 0x66, 0x6F, 0x6F, 0x2F, 0x62, 0x61, 0x72, 0x00, 0x2A, 0x62,
            0x61, 0x7A,
        ];
        let packet = roundtrip_test(bytes);
        assert_eq!(packet.qos, QoS::AtLeastOnce);
        assert_eq!(packet.topic, b"foo/bar");
        assert_eq!(packet.packet_id, Some(42));
        assert_eq!(packet.payload, b"baz");
    }

    #[test]
    fn test_qos2_with_packet_id_max() {
        let packet = roundtrip_test(&[0x34, 0x05, 0x00, 0x01, 0x61, 0xFF, 0xFF]);
        assert_eq!(packet.qos, QoS::ExactlyOnce);
        assert_eq!(packet.packet_id, Some(65535));
    }

    #[test]
    fn test_dup_flag() {
        let packet = roundtrip_test(&[0x38, 0x03, 0x00, 0x01, 0x61]);
        assert!(packet.dup);
    }

    #[test]
    fn test_retain_flag() {
        let packet = roundtrip_test(&[0x31, 0x03, 0x00, 0x01, 0x61]);
        assert!(packet.retain);
    }

    #[test]
    fn test_dup_and_retain_flags() {
        let packet = roundtrip_test(&[0x3B, 0x05, 0x00, 0x01, 0x61, 0x00, 0x01]);
        assert!(packet.dup);
        assert!(packet.retain);
        assert_eq!(packet.qos, QoS::AtLeastOnce);
    }

    #[test]
    fn test_payload_binary() {
        let packet = roundtrip_test(&[0x30, 0x08, 0x00, 0x01, 0x61, 0x00, 0x01, 0x02, 0xFF, 0xFE]);
        assert_eq!(packet.payload, &[0x00, 0x01, 0x02, 0xFF, 0xFE]);
    }

    #[test]
    fn test_qos2_retained() {
        let packet = roundtrip_test(&[0x35, 0x08, 0x00, 0x03, 0x61, 0x2F, 0x62, 0x12, 0x34, 0x58]);
        assert_eq!(packet.qos, QoS::ExactlyOnce);
        assert!(packet.retain);
        assert_eq!(packet.topic, b"a/b");
        assert_eq!(packet.packet_id, Some(0x1234));
        assert_eq!(packet.payload, b"X");
    }

    #[test]
    fn test_invalid_qos_3() {
        let result = Packet::decode(&[0x36, 0x05, 0x00, 0x01, 0x61, 0x00, 0x01]);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidQosLevel { level: 3 })
        ));
    }

    #[test]
    fn test_qos1_packet_id_zero_rejected() {
        let result = Packet::decode(&[0x32, 0x05, 0x00, 0x01, 0x61, 0x00, 0x00]);
        assert!(matches!(result, Err(ProtocolError::MissingPacketId)));
    }

    #[test]
    fn test_encode_qos1_without_packet_id_rejected() {
        let publish = Publish {
            dup: false,
            qos: QoS::AtLeastOnce,
            retain: false,
            topic: b"a",
            packet_id: None,
            payload: b"",
        };
        let mut buffer = [0u8; 16];
        assert!(matches!(
            Packet::Publish(publish).encode(&mut buffer),
            Err(ProtocolError::MissingPacketId)
        ));
    }

    #[test]
    fn test_truncated_topic() {
        let result = Packet::decode(&[0x30, 0x03, 0x00, 0x05, 0x61]);
        assert!(matches!(
            result,
            Err(ProtocolError::IncompletePacket { .. })
        ));
    }
}
