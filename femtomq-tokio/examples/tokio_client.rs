use std::io;

use femtomq_core::{
    ConnectOptions, MqttClient, Packet, PublishOptions, QoS, Subscription,
};
use femtomq_tokio::{drive, StdClock};
use log::info;
use tokio::net::TcpStream;

// Configuration (hardcoded for this example)
const BROKER_ADDR: &str = "127.0.0.1:1883";
const CLIENT_ID: &[u8] = b"femtomq-client";
const TOPIC: &[u8] = b"test/topic";
const MESSAGE: &[u8] = b"Hello from femtomq!";
const KEEP_ALIVE: u16 = 30;

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Connecting to broker at {}", BROKER_ADDR);
    let mut stream = TcpStream::connect(BROKER_ADDR).await?;

    let mut inbound = [0u8; 4096];
    let mut outbound = [0u8; 4096];
    let mut client = MqttClient::<'_, _, 128>::new(&mut inbound, &mut outbound, StdClock::new())
        .map_err(io::Error::other)?;

    client
        .connect(&ConnectOptions {
            client_id: CLIENT_ID,
            clean_session: true,
            keep_alive_secs: KEEP_ALIVE,
            ..Default::default()
        })
        .map_err(io::Error::other)?;
    client
        .subscribe(&[Subscription {
            topic_filter: TOPIC,
            qos: QoS::AtLeastOnce,
        }])
        .map_err(io::Error::other)?;
    client
        .publish(
            TOPIC,
            MESSAGE,
            &PublishOptions {
                qos: QoS::AtLeastOnce,
                retain: false,
            },
        )
        .map_err(io::Error::other)?;

    // pump the connection until the broker closes it
    drive(&mut stream, &mut client, |packet: &Packet<'_>| match packet {
        Packet::ConnAck(connack) => {
            info!(
                "Connected, session present: {}, return code: {:?}",
                connack.session_present, connack.return_code
            );
        }
        Packet::SubAck(suback) => info!("Subscribed, packet_id {}", suback.packet_id),
        Packet::PubAck(puback) => info!("Publish acknowledged, packet_id {}", puback.packet_id),
        Packet::Publish(publish) => {
            info!(
                "Message on '{}': {}",
                String::from_utf8_lossy(publish.topic),
                String::from_utf8_lossy(publish.payload)
            );
        }
        other => info!("Received {:?}", other.packet_type()),
    })
    .await
}
