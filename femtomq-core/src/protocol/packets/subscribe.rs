use crate::protocol::packet_type::PacketType;
use crate::protocol::packets::{PacketBody, RESERVED_FLAGS};
use crate::protocol::qos::QoS;
use crate::protocol::utils::{variable_length_length, ByteReader, ByteWriter, MAX_REMAINING_LENGTH};
use crate::protocol::ProtocolError;

/// One requested subscription: a topic filter and the maximum QoS the
/// client is willing to receive on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription<'a> {
    pub topic_filter: &'a [u8],
    pub qos: QoS,
}

/// Decoded SUBSCRIBE topic list, kept in wire form.
///
/// The core cannot allocate, so the list is validated once at decode time
/// and iterated on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicFilters<'a> {
    wire: &'a [u8],
}

impl<'a> TopicFilters<'a> {
    fn validate(wire: &'a [u8]) -> Result<Self, ProtocolError> {
        if wire.is_empty() {
            return Err(ProtocolError::EmptyTopics);
        }
        let mut reader = ByteReader::new(wire);
        while !reader.is_empty() {
            reader.take_string()?;
            QoS::from_u8(reader.take_u8()?)?;
        }
        Ok(Self { wire })
    }

    pub(crate) fn as_bytes(&self) -> &'a [u8] {
        self.wire
    }

    pub fn iter(&self) -> SubscriptionIter<'a> {
        SubscriptionIter {
            reader: ByteReader::new(self.wire),
        }
    }
}

impl<'a> IntoIterator for &TopicFilters<'a> {
    type Item = Subscription<'a>;
    type IntoIter = SubscriptionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Yields the subscriptions of a validated [`TopicFilters`] list.
#[derive(Debug, Clone)]
pub struct SubscriptionIter<'a> {
    reader: ByteReader<'a>,
}

impl<'a> Iterator for SubscriptionIter<'a> {
    type Item = Subscription<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_empty() {
            return None;
        }
        // validated at decode time, so these reads cannot fail
        let topic_filter = self.reader.take_string().ok()?;
        let qos = QoS::from_u8(self.reader.take_u8().ok()?).ok()?;
        Some(Subscription { topic_filter, qos })
    }
}

/// SUBSCRIBE is transmitted with fixed header flags 0b0010 (a
/// reserved-bits requirement of the protocol; see `Packet::flags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscribe<'a> {
    pub packet_id: u16,
    pub topics: TopicFilters<'a>,
}

impl<'a> Subscribe<'a> {
    pub fn decode(_flags: u8, body: &'a [u8]) -> Result<Self, ProtocolError> {
        let mut reader = ByteReader::new(body);
        let packet_id = reader.take_u16()?;
        if packet_id == 0 {
            return Err(ProtocolError::MissingPacketId);
        }
        let topics = TopicFilters::validate(reader.take_rest())?;
        Ok(Self { packet_id, topics })
    }

    /// Serialize a SUBSCRIBE straight from a subscription list, fixed
    /// header included. The enqueue path uses this because the wire form
    /// does not exist yet.
    pub fn encode_list(
        packet_id: u16,
        subscriptions: &[Subscription<'_>],
        buffer: &mut [u8],
    ) -> Result<usize, ProtocolError> {
        if subscriptions.is_empty() {
            return Err(ProtocolError::EmptyTopics);
        }
        let body_len = 2 + subscriptions
            .iter()
            .map(|s| 2 + s.topic_filter.len() + 1)
            .sum::<usize>();
        if body_len > MAX_REMAINING_LENGTH {
            return Err(ProtocolError::InvalidLengthEncoding);
        }

        let mut writer = ByteWriter::new(buffer);
        writer.put_u8((PacketType::Subscribe as u8) << 4 | RESERVED_FLAGS)?;
        writer.put_variable_length(body_len)?;
        writer.put_u16(packet_id)?;
        for subscription in subscriptions {
            writer.put_string(subscription.topic_filter)?;
            writer.put_u8(subscription.qos as u8)?;
        }
        Ok(writer.written())
    }

    #[allow(dead_code)]
    pub(crate) fn list_encoded_len(subscriptions: &[Subscription<'_>]) -> usize {
        let body_len = 2 + subscriptions
            .iter()
            .map(|s| 2 + s.topic_filter.len() + 1)
            .sum::<usize>();
        1 + variable_length_length(body_len) + body_len
    }
}

impl PacketBody for Subscribe<'_> {
    fn body_len(&self) -> usize {
        2 + self.topics.as_bytes().len()
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u16(self.packet_id)?;
        writer.put_bytes(self.topics.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::Packet;

    fn roundtrip_test(bytes: &[u8]) -> Subscribe<'_> {
        let packet = match Packet::decode(bytes) {
            Ok(Packet::Subscribe(subscribe)) => subscribe,
            other => panic!("expected SUBSCRIBE, got {:?}", other),
        };
        let mut buffer = [0u8; 256];
        let encoded_size = Packet::Subscribe(packet).encode(&mut buffer).unwrap();
        assert_eq!(encoded_size, bytes.len(), "Encoded size mismatch");
        assert_eq!(&buffer[..encoded_size], bytes, "Encoded bytes mismatch");
        packet
    }

    #[test]
    fn test_subscribe_single_topic_roundtrip() {
        let bytes: &[u8] = &[
            0x82, 0x0A, // Fixed header (flags 0b0010, remaining length = 10)
            0x00, 0x01, // Packet ID
            0x00, 0x05, // Topic Filter Length
            0x61, 0x2F, 0x62, 0x2F, 0x63, // Topic Filter "a/b/c"
            0x01, // Requested QoS 1
        ];
        let packet = roundtrip_test(bytes);
        assert_eq!(packet.packet_id, 1);
        let mut iter = packet.topics.iter();
        let first = iter.next().unwrap();
        assert_eq!(first.topic_filter, b"a/b/c");
        assert_eq!(first.qos, QoS::AtLeastOnce);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_subscribe_multiple_topics() {
        let bytes: &[u8] = &[
            0x82, 0x0E, // Fixed header (remaining length = 14)
            0x00, 0x2A, // Packet ID (42)
            0x00, 0x03, 0x66, 0x6F, 0x6F, 0x00, // "foo" QoS 0
            0x00, 0x03, 0x62, 0x61, 0x72, 0x02, // "bar" QoS 2
        ];
        let packet = roundtrip_test(bytes);
        assert_eq!(packet.packet_id, 42);
        let topics: heapless::Vec<_, 4> = packet.topics.iter().collect();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].topic_filter, b"foo");
        assert_eq!(topics[0].qos, QoS::AtMostOnce);
        assert_eq!(topics[1].topic_filter, b"bar");
        assert_eq!(topics[1].qos, QoS::ExactlyOnce);
    }

    #[test]
    fn test_subscribe_empty_topic_list_rejected() {
        let result = Packet::decode(&[0x82, 0x02, 0x00, 0x01]);
        assert!(matches!(result, Err(ProtocolError::EmptyTopics)));
    }

    #[test]
    fn test_subscribe_invalid_qos_rejected() {
        let bytes: &[u8] = &[
            0x82, 0x08, 0x00, 0x01, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x03, // "foo" QoS 3
        ];
        let result = Packet::decode(bytes);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidQosLevel { level: 3 })
        ));
    }

    #[test]
    fn test_subscribe_packet_id_zero_rejected() {
        let bytes: &[u8] = &[0x82, 0x08, 0x00, 0x00, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x00];
        let result = Packet::decode(bytes);
        assert!(matches!(result, Err(ProtocolError::MissingPacketId)));
    }

    #[test]
    fn test_subscribe_encode_list_matches_wire_form() {
        let subscriptions = [
            Subscription {
                topic_filter: b"foo",
                qos: QoS::AtMostOnce,
            },
            Subscription {
                topic_filter: b"bar",
                qos: QoS::ExactlyOnce,
            },
        ];
        let mut buffer = [0u8; 64];
        let written = Subscribe::encode_list(42, &subscriptions, &mut buffer).unwrap();
        assert_eq!(written, Subscribe::list_encoded_len(&subscriptions));
        assert_eq!(
            &buffer[..written],
            &[
                0x82, 0x0E, 0x00, 0x2A, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x00, 0x00, 0x03, 0x62,
                0x61, 0x72, 0x02,
            ]
        );
    }

    #[test]
    fn test_subscribe_encode_empty_list_rejected() {
        let mut buffer = [0u8; 16];
        assert!(matches!(
            Subscribe::encode_list(1, &[], &mut buffer),
            Err(ProtocolError::EmptyTopics)
        ));
    }
}
