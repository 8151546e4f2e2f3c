//! Tokio pump between a byte stream and the client engine
//!
//! The engine never touches the socket; this module reads some bytes,
//! feeds them through the client slicing by `consumed`, writes every
//! outgoing buffer back to the stream, and hands incoming packets to a
//! host callback.

use std::io;
use std::time::Duration;

use femtomq_core::{Clock, Event, MqttClient, Packet};
use log::warn;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// How long a read may sit idle before the engine gets a chance to run
/// its keepalive check.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Feed `input` through the client until it reports nothing left to do,
/// writing outbound buffers to the stream and handing each incoming
/// packet to `on_packet`.
///
/// Session errors are logged and skipped; the engine recovers on its own.
pub async fn exchange<S, C, F, const MAX_PENDING_PUBREC: usize>(
    stream: &mut S,
    client: &mut MqttClient<'_, C, MAX_PENDING_PUBREC>,
    mut input: &[u8],
    on_packet: &mut F,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: Clock,
    F: FnMut(&Packet<'_>),
{
    loop {
        let result = client.feed(input);
        input = &input[result.consumed..];
        match result.event {
            Event::None => return Ok(()),
            Event::Outgoing(bytes) => stream.write_all(bytes).await?,
            Event::Incoming(packet) => on_packet(&packet),
            Event::Error(e) => warn!("session error: {}", e),
        }
    }
}

/// Run the client until the stream closes: read, feed, write, repeat.
///
/// An idle read still wakes the engine once a second so keepalive
/// PINGREQs go out on time.
pub async fn drive<S, C, F, const MAX_PENDING_PUBREC: usize>(
    stream: &mut S,
    client: &mut MqttClient<'_, C, MAX_PENDING_PUBREC>,
    mut on_packet: F,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: Clock,
    F: FnMut(&Packet<'_>),
{
    let mut read_buf = [0u8; 4096];
    loop {
        exchange(stream, client, &[], &mut on_packet).await?;
        match tokio::time::timeout(IDLE_POLL, stream.read(&mut read_buf)).await {
            Err(_elapsed) => continue,
            Ok(Ok(0)) => return Ok(()),
            Ok(Ok(n)) => exchange(stream, client, &read_buf[..n], &mut on_packet).await?,
            Ok(Err(e)) => return Err(e),
        }
    }
}
