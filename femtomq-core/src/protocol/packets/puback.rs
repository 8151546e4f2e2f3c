use crate::protocol::packets::PacketBody;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubAck {
    pub packet_id: u16,
}

impl PubAck {
    pub fn decode(_flags: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        let packet_id = ByteReader::new(body).take_u16()?;
        Ok(Self { packet_id })
    }
}

impl PacketBody for PubAck {
    fn body_len(&self) -> usize {
        2
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u16(self.packet_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::Packet;

    fn roundtrip_test(bytes: &[u8]) -> PubAck {
        let packet = match Packet::decode(bytes) {
            Ok(Packet::PubAck(puback)) => puback,
            other => panic!("expected PUBACK, got {:?}", other),
        };
        let mut buffer = [0u8; 8];
        let encoded_size = Packet::PubAck(packet).encode(&mut buffer).unwrap();
        assert_eq!(encoded_size, bytes.len(), "Encoded size mismatch");
        assert_eq!(&buffer[..encoded_size], bytes, "Encoded bytes mismatch");
        packet
    }

    #[test]
    fn test_puback_packet_roundtrip() {
        let packet = roundtrip_test(&[0x40, 0x02, 0x00, 0x2A]);
        assert_eq!(packet.packet_id, 42);
    }

    #[test]
    fn test_puback_packet_id_max() {
        let packet = roundtrip_test(&[0x40, 0x02, 0xFF, 0xFF]);
        assert_eq!(packet.packet_id, 65535);
    }

    #[test]
    fn test_puback_truncated_body() {
        let result = Packet::decode(&[0x40, 0x01, 0x00]);
        assert!(matches!(
            result,
            Err(ProtocolError::IncompletePacket { .. })
        ));
    }
}
