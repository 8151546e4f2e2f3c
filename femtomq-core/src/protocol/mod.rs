mod error;
pub mod packet_type;
pub mod packets;
pub mod qos;
mod utils;

pub use crate::protocol::error::ProtocolError;
pub use crate::protocol::packet_type::PacketType;
pub use crate::protocol::qos::QoS;
pub use crate::protocol::utils::{
    read_variable_length, variable_length_length, write_variable_length, ByteReader, ByteWriter,
    MAX_REMAINING_LENGTH,
};
