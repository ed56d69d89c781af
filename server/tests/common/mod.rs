#![allow(dead_code)]

use std::fmt::Debug;
use std::time::Duration;

use awc::ws;
use futures_util::{Sink, SinkExt as _, Stream, StreamExt as _};
use system::serde_json::{self, json, Value};

use canvas_relay_server::config::Config;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE: Duration = Duration::from_millis(300);

pub fn test_config() -> Config {
    Config {
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").into(),
        ..Config::default()
    }
}

pub async fn send_json<S>(conn: &mut S, value: Value)
where
    S: Sink<ws::Message> + Unpin,
    S::Error: Debug,
{
    conn.send(ws::Message::Text(value.to_string().into()))
        .await
        .expect("frame must be sent");
}

pub async fn next_frame<S, E>(conn: &mut S) -> ws::Frame
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: Debug,
{
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, conn.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("protocol error");
        match frame {
            ws::Frame::Ping(_) | ws::Frame::Pong(_) => continue,
            frame => return frame,
        }
    }
}

pub async fn recv_json<S, E>(conn: &mut S) -> Value
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: Debug,
{
    match next_frame(conn).await {
        ws::Frame::Text(bytes) => serde_json::from_slice(&bytes).expect("frame must be json"),
        other => panic!("unexpected frame {:?}", other),
    }
}

pub async fn assert_silent<S, E>(conn: &mut S)
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: Debug,
{
    let received = tokio::time::timeout(SILENCE, async {
        loop {
            match conn.next().await {
                Some(Ok(ws::Frame::Ping(_))) | Some(Ok(ws::Frame::Pong(_))) => continue,
                other => return format!("{:?}", other),
            }
        }
    })
    .await;
    assert!(received.is_err(), "unexpected frame {:?}", received);
}

/// Answers heartbeat pings for `duration`, failing on any other frame.
pub async fn keep_alive<S, E>(conn: &mut S, duration: Duration)
where
    S: Stream<Item = Result<ws::Frame, E>> + Sink<ws::Message> + Unpin,
    E: Debug,
    <S as Sink<ws::Message>>::Error: Debug,
{
    let deadline = tokio::time::Instant::now() + duration;
    while let Ok(frame) = tokio::time::timeout_at(deadline, conn.next()).await {
        match frame {
            Some(Ok(ws::Frame::Ping(bytes))) => conn
                .send(ws::Message::Pong(bytes))
                .await
                .expect("pong must be sent"),
            other => panic!("unexpected frame {:?}", other),
        }
    }
}

/// Waits until the server ends the connection, skipping heartbeat pings.
pub async fn wait_closed<S, E>(conn: &mut S)
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: Debug,
{
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match conn.next().await {
                Some(Ok(ws::Frame::Ping(_))) | Some(Ok(ws::Frame::Pong(_))) => continue,
                Some(Ok(ws::Frame::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(other)) => panic!("unexpected frame {:?}", other),
            }
        }
    })
    .await
    .expect("connection must be closed by the server");
}

/// Runs the client-ready handshake. Once the reply is back the connection is
/// registered ahead of any broadcast sent afterwards.
pub async fn handshake<S, E>(conn: &mut S)
where
    S: Stream<Item = Result<ws::Frame, E>> + Sink<ws::Message> + Unpin,
    E: Debug,
    <S as Sink<ws::Message>>::Error: Debug,
{
    send_json(conn, json!({"type": "client-ready", "data": null})).await;
    assert_eq!(
        recv_json(conn).await,
        json!({"type": "get-canvas-state", "data": null})
    );
}
