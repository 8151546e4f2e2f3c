use crate::protocol::packet_type::PacketType;
use crate::protocol::packets::{PacketBody, RESERVED_FLAGS};
use crate::protocol::utils::{ByteReader, ByteWriter, MAX_REMAINING_LENGTH};
use crate::protocol::ProtocolError;

/// Decoded UNSUBSCRIBE filter list, kept in wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterList<'a> {
    wire: &'a [u8],
}

impl<'a> FilterList<'a> {
    fn validate(wire: &'a [u8]) -> Result<Self, ProtocolError> {
        if wire.is_empty() {
            return Err(ProtocolError::EmptyTopicFilters);
        }
        let mut reader = ByteReader::new(wire);
        while !reader.is_empty() {
            reader.take_string()?;
        }
        Ok(Self { wire })
    }

    pub(crate) fn as_bytes(&self) -> &'a [u8] {
        self.wire
    }

    pub fn iter(&self) -> FilterIter<'a> {
        FilterIter {
            reader: ByteReader::new(self.wire),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterIter<'a> {
    reader: ByteReader<'a>,
}

impl<'a> Iterator for FilterIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_empty() {
            return None;
        }
        // validated at decode time, so this read cannot fail
        self.reader.take_string().ok()
    }
}

/// UNSUBSCRIBE is transmitted with fixed header flags 0b0010 (a
/// reserved-bits requirement of the protocol; see `Packet::flags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsubscribe<'a> {
    pub packet_id: u16,
    pub topic_filters: FilterList<'a>,
}

impl<'a> Unsubscribe<'a> {
    pub fn decode(_flags: u8, body: &'a [u8]) -> Result<Self, ProtocolError> {
        let mut reader = ByteReader::new(body);
        let packet_id = reader.take_u16()?;
        if packet_id == 0 {
            return Err(ProtocolError::MissingPacketId);
        }
        let topic_filters = FilterList::validate(reader.take_rest())?;
        Ok(Self {
            packet_id,
            topic_filters,
        })
    }

    /// Serialize an UNSUBSCRIBE straight from a filter list, fixed header
    /// included.
    pub fn encode_list(
        packet_id: u16,
        topic_filters: &[&[u8]],
        buffer: &mut [u8],
    ) -> Result<usize, ProtocolError> {
        if topic_filters.is_empty() {
            return Err(ProtocolError::EmptyTopicFilters);
        }
        let body_len = 2 + topic_filters.iter().map(|f| 2 + f.len()).sum::<usize>();
        if body_len > MAX_REMAINING_LENGTH {
            return Err(ProtocolError::InvalidLengthEncoding);
        }

        let mut writer = ByteWriter::new(buffer);
        writer.put_u8((PacketType::Unsubscribe as u8) << 4 | RESERVED_FLAGS)?;
        writer.put_variable_length(body_len)?;
        writer.put_u16(packet_id)?;
        for filter in topic_filters {
            writer.put_string(filter)?;
        }
        Ok(writer.written())
    }
}

impl PacketBody for Unsubscribe<'_> {
    fn body_len(&self) -> usize {
        2 + self.topic_filters.as_bytes().len()
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u16(self.packet_id)?;
        writer.put_bytes(self.topic_filters.as_bytes())
    }
}
