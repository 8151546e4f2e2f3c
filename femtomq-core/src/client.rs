//! Application-facing client API
//!
//! [`MqttClient`] pairs the session engine with a clock and the packet id
//! allocator. Every operation only serializes a packet onto the outbound
//! scratch; the host drains it through [`MqttClient::feed`] and writes the
//! bytes to its transport.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::error::ClientError;
use crate::protocol::packets::{
    Connect, Disconnect, Packet, PingReq, Publish, Subscribe, Subscription, Unsubscribe, Will,
};
use crate::protocol::qos::QoS;
use crate::protocol::ProtocolError;
use crate::session::{FeedResult, Session};
use crate::time::Clock;

/// CONNECT parameters.
///
/// The defaults are a fresh anonymous session with a 30 second keepalive.
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions<'a> {
    pub client_id: &'a [u8],
    pub clean_session: bool,
    pub keep_alive_secs: u16,
    pub will: Option<Will<'a>>,
    pub username: Option<&'a [u8]>,
    pub password: Option<&'a [u8]>,
}

impl Default for ConnectOptions<'_> {
    fn default() -> Self {
        Self {
            client_id: b"",
            clean_session: false,
            keep_alive_secs: 30,
            will: None,
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    pub qos: QoS,
    pub retain: bool,
}

/// MQTT 3.1.1 client over caller-provided scratch buffers.
///
/// Single-threaded cooperative: one owner drives it, and no operation
/// blocks. Only the packet id counter is concurrency-aware, so id
/// allocation alone stays correct if a host serializes the rest behind a
/// lock of its own.
pub struct MqttClient<'buf, C: Clock, const MAX_PENDING_PUBREC: usize = 128> {
    session: Session<'buf, MAX_PENDING_PUBREC>,
    clock: C,
    last_now_ms: u64,
    next_packet_id: AtomicU16,
}

impl<'buf, C: Clock, const MAX_PENDING_PUBREC: usize> MqttClient<'buf, C, MAX_PENDING_PUBREC> {
    /// Create a client over the caller's scratch buffers.
    ///
    /// Fails with [`ClientError::ClockUnavailable`] when the clock cannot
    /// report monotonic time.
    pub fn new(
        inbound_scratch: &'buf mut [u8],
        outbound_scratch: &'buf mut [u8],
        clock: C,
    ) -> Result<Self, ClientError> {
        let now_ms = clock.now_millis().ok_or(ClientError::ClockUnavailable)?;
        Ok(Self {
            session: Session::new(inbound_scratch, outbound_scratch, now_ms),
            clock,
            last_now_ms: now_ms,
            next_packet_id: AtomicU16::new(1),
        })
    }

    /// A clock that stops reporting after construction freezes time
    /// rather than killing the session.
    fn now_ms(&mut self) -> u64 {
        if let Some(now_ms) = self.clock.now_millis() {
            self.last_now_ms = now_ms;
        }
        self.last_now_ms
    }

    /// Advance the session; see [`Session::feed`].
    pub fn feed(&mut self, input: &[u8]) -> FeedResult<'_> {
        let now_ms = self.now_ms();
        self.session.feed(input, now_ms)
    }

    /// Packet ids of QoS 2 publishes received but not yet released.
    pub fn pending_pubrec(&self) -> &[u16] {
        self.session.pending_pubrec()
    }

    /// Enqueue a CONNECT and arm the keepalive timer.
    pub fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), ClientError> {
        let now_ms = self.now_ms();
        self.session.set_keep_alive(options.keep_alive_secs);
        self.session.enqueue(
            &Packet::Connect(Connect {
                clean_session: options.clean_session,
                keep_alive: options.keep_alive_secs,
                client_id: options.client_id,
                will: options.will,
                username: options.username,
                password: options.password,
            }),
            now_ms,
        )
    }

    /// Enqueue a PUBLISH.
    ///
    /// QoS 0 sends without a packet id and returns `None`; QoS 1 and 2
    /// allocate one and return it so the host can correlate the broker's
    /// PUBACK or PUBREC. Retransmit tracking is the host's concern.
    pub fn publish(
        &mut self,
        topic: &[u8],
        payload: &[u8],
        options: &PublishOptions,
    ) -> Result<Option<u16>, ClientError> {
        let packet_id = match options.qos {
            QoS::AtMostOnce => None,
            QoS::AtLeastOnce | QoS::ExactlyOnce => Some(self.allocate_packet_id()),
        };
        let now_ms = self.now_ms();
        self.session.enqueue(
            &Packet::Publish(Publish {
                dup: false,
                qos: options.qos,
                retain: options.retain,
                topic,
                packet_id,
                payload,
            }),
            now_ms,
        )?;
        Ok(packet_id)
    }

    /// Enqueue a SUBSCRIBE; returns the packet id for correlation with
    /// the broker's SUBACK.
    pub fn subscribe(&mut self, subscriptions: &[Subscription<'_>]) -> Result<u16, ClientError> {
        if subscriptions.is_empty() {
            return Err(ProtocolError::EmptyTopics.into());
        }
        let packet_id = self.allocate_packet_id();
        let now_ms = self.now_ms();
        self.session
            .enqueue_with(now_ms, |buffer| {
                Subscribe::encode_list(packet_id, subscriptions, buffer)
            })?;
        Ok(packet_id)
    }

    /// Enqueue an UNSUBSCRIBE; returns the packet id for correlation with
    /// the broker's UNSUBACK.
    pub fn unsubscribe(&mut self, topic_filters: &[&[u8]]) -> Result<u16, ClientError> {
        if topic_filters.is_empty() {
            return Err(ProtocolError::EmptyTopicFilters.into());
        }
        let packet_id = self.allocate_packet_id();
        let now_ms = self.now_ms();
        self.session
            .enqueue_with(now_ms, |buffer| {
                Unsubscribe::encode_list(packet_id, topic_filters, buffer)
            })?;
        Ok(packet_id)
    }

    /// Enqueue a PINGREQ ahead of the keepalive deadline.
    pub fn ping(&mut self) -> Result<(), ClientError> {
        let now_ms = self.now_ms();
        self.session.enqueue(&Packet::PingReq(PingReq), now_ms)
    }

    /// Enqueue a DISCONNECT.
    pub fn disconnect(&mut self) -> Result<(), ClientError> {
        let now_ms = self.now_ms();
        self.session.enqueue(&Packet::Disconnect(Disconnect), now_ms)
    }

    /// Monotonically increasing 16-bit id; 0 is forbidden on the wire and
    /// skipped on wrap.
    fn allocate_packet_id(&self) -> u16 {
        loop {
            let packet_id = self.next_packet_id.fetch_add(1, Ordering::Relaxed);
            if packet_id != 0 {
                return packet_id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Event;
    use crate::time::DummyClock;
    use core::cell::Cell;

    struct ManualClock {
        now_ms: Cell<u64>,
    }

    impl Clock for &ManualClock {
        fn now_millis(&self) -> Option<u64> {
            Some(self.now_ms.get())
        }
    }

    struct BrokenClock;

    impl Clock for BrokenClock {
        fn now_millis(&self) -> Option<u64> {
            None
        }
    }

    fn expect_outgoing<C: Clock>(client: &mut MqttClient<'_, C, 8>) -> heapless::Vec<u8, 128> {
        let result = client.feed(&[]);
        match result.event {
            Event::Outgoing(bytes) => heapless::Vec::from_slice(bytes).unwrap(),
            other => panic!("expected outgoing bytes, got {:?}", other),
        }
    }

    #[test]
    fn test_new_fails_without_clock() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let result = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, BrokenClock);
        assert!(matches!(result, Err(ClientError::ClockUnavailable)));
    }

    #[test]
    fn test_connect_serializes_expected_bytes() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        client
            .connect(&ConnectOptions {
                client_id: b"foobar",
                keep_alive_secs: 30,
                ..Default::default()
            })
            .unwrap();

        let expected: &[u8] = &[
            0x10, 0x12, 0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, 0x04, 0x00, 0x00, 0x1E, 0x00, 0x06,
            0x66, 0x6F, 0x6F, 0x62, 0x61, 0x72,
        ];
        assert_eq!(expect_outgoing(&mut client).as_slice(), expected);
    }

    #[test]
    fn test_publish_qos0_has_no_packet_id() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        let packet_id = client
            .publish(b"test", b"hi", &PublishOptions::default())
            .unwrap();
        assert_eq!(packet_id, None);
        assert_eq!(
            expect_outgoing(&mut client).as_slice(),
            &[0x30, 0x08, 0x00, 0x04, 0x74, 0x65, 0x73, 0x74, 0x68, 0x69]
        );
    }

    #[test]
    fn test_publish_qos1_allocates_packet_id() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        let packet_id = client
            .publish(
                b"t",
                b"",
                &PublishOptions {
                    qos: QoS::AtLeastOnce,
                    retain: false,
                },
            )
            .unwrap();
        assert_eq!(packet_id, Some(1));
        assert_eq!(
            expect_outgoing(&mut client).as_slice(),
            &[0x32, 0x05, 0x00, 0x01, 0x74, 0x00, 0x01]
        );
    }

    #[test]
    fn test_subscribe_returns_packet_id_and_reserved_flags() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        let packet_id = client
            .subscribe(&[Subscription {
                topic_filter: b"a/b",
                qos: QoS::AtLeastOnce,
            }])
            .unwrap();
        assert_eq!(packet_id, 1);
        assert_eq!(
            expect_outgoing(&mut client).as_slice(),
            &[0x82, 0x08, 0x00, 0x01, 0x00, 0x03, 0x61, 0x2F, 0x62, 0x01]
        );
    }

    #[test]
    fn test_subscribe_empty_list_rejected() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();
        assert!(matches!(
            client.subscribe(&[]),
            Err(ClientError::Protocol(ProtocolError::EmptyTopics))
        ));
    }

    #[test]
    fn test_unsubscribe_wire_form() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        let packet_id = client.unsubscribe(&[b"a/b".as_ref()]).unwrap();
        assert_eq!(packet_id, 1);
        assert_eq!(
            expect_outgoing(&mut client).as_slice(),
            &[0xA2, 0x07, 0x00, 0x01, 0x00, 0x03, 0x61, 0x2F, 0x62]
        );
    }

    #[test]
    fn test_packet_id_allocation_skips_zero_on_wrap() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        client.next_packet_id.store(0xFFFF, Ordering::Relaxed);
        assert_eq!(client.allocate_packet_id(), 0xFFFF);
        assert_eq!(client.allocate_packet_id(), 1);
        assert_eq!(client.allocate_packet_id(), 2);
    }

    #[test]
    fn test_packet_ids_are_unique_across_operations() {
        let (mut rx, mut tx) = ([0u8; 256], [0u8; 256]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        let qos1 = PublishOptions {
            qos: QoS::AtLeastOnce,
            retain: false,
        };
        let first = client.publish(b"t", b"", &qos1).unwrap().unwrap();
        let second = client
            .subscribe(&[Subscription {
                topic_filter: b"t",
                qos: QoS::AtMostOnce,
            }])
            .unwrap();
        let third = client.unsubscribe(&[b"t".as_ref()]).unwrap();
        assert_eq!((first, second, third), (1, 2, 3));
    }

    #[test]
    fn test_connect_arms_keepalive() {
        let clock = ManualClock {
            now_ms: Cell::new(0),
        };
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, &clock).unwrap();

        client
            .connect(&ConnectOptions {
                client_id: b"kp",
                keep_alive_secs: 10,
                clean_session: true,
                ..Default::default()
            })
            .unwrap();
        let _ = expect_outgoing(&mut client); // drain the CONNECT

        clock.now_ms.set(9_000);
        assert_eq!(client.feed(&[]).event, Event::None);

        clock.now_ms.set(10_001);
        assert_eq!(expect_outgoing(&mut client).as_slice(), &[0xC0, 0x00]);
    }

    #[test]
    fn test_ping_and_disconnect() {
        let (mut rx, mut tx) = ([0u8; 64], [0u8; 64]);
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        client.ping().unwrap();
        client.disconnect().unwrap();
        assert_eq!(
            expect_outgoing(&mut client).as_slice(),
            &[0xC0, 0x00, 0xE0, 0x00]
        );
    }

    #[test]
    fn test_publish_larger_than_outbound_scratch_rejected() {
        let mut rx = [0u8; 16];
        let mut tx = [0u8; 16];
        let mut client = MqttClient::<'_, _, 8>::new(&mut rx, &mut tx, DummyClock).unwrap();

        let result = client.publish(b"topic", &[0u8; 64], &PublishOptions::default());
        assert!(matches!(
            result,
            Err(ClientError::Protocol(ProtocolError::BufferTooSmall { .. }))
        ));
    }
}
