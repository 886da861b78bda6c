//! Integration tests for the Codehunt gateway: handshake, keep-alive, and
//! intents flowing through the engine to connected actors.

use std::time::Duration;

use codehunt::prelude::*;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

const TOKEN: &str = "s3cret";
const ADMIN: u64 = 1;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port with actor 1 as admin and returns the address.
async fn start_server() -> String {
    let server = CodehuntServer::builder()
        .bind("127.0.0.1:0")
        .engine_config(EngineConfig::new([ActorId(ADMIN)]))
        .build(MemoryStore::new(), SharedSecretAuth::new(TOKEN))
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn encode_envelope(envelope: &Envelope) -> Message {
    let bytes = serde_json::to_vec(envelope).expect("encode");
    Message::Binary(bytes.into())
}

fn decode_envelope(msg: Message) -> Envelope {
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

fn handshake_frame(version: u32, token: &str, actor: u64, username: &str) -> Envelope {
    Envelope::new(
        0,
        0,
        Frame::Handshake {
            version,
            token: token.into(),
            actor_id: ActorId(actor),
            profile: Profile {
                username: Some(username.into()),
                ..Profile::default()
            },
        },
    )
}

/// Sends a valid handshake and returns the reply envelope.
async fn handshake(ws: &mut ClientWs, actor: u64, username: &str) -> Envelope {
    let hs = handshake_frame(PROTOCOL_VERSION, TOKEN, actor, username);
    ws.send(encode_envelope(&hs)).await.expect("send handshake");
    let msg = ws.next().await.unwrap().expect("recv ack");
    decode_envelope(msg)
}

/// Connects and authenticates `actor`.
async fn join(addr: &str, actor: u64, username: &str) -> ClientWs {
    let mut ws = connect(addr).await;
    let ack = handshake(&mut ws, actor, username).await;
    assert!(matches!(ack.frame, Frame::HandshakeAck { .. }), "{ack:?}");
    ws
}

async fn send_frame(ws: &mut ClientWs, frame: Frame) {
    ws.send(encode_envelope(&Envelope::new(1, 0, frame)))
        .await
        .expect("send");
}

async fn send_intent(ws: &mut ClientWs, intent: Intent) {
    send_frame(ws, Frame::Intent { intent }).await;
}

async fn command(ws: &mut ClientWs, name: &str) {
    send_intent(ws, Intent::Command { name: name.into() }).await;
}

/// Reads frames until a notice whose text starts with `prefix` arrives.
async fn expect_notice(ws: &mut ClientWs, prefix: &str) -> Notice {
    let wait = async {
        loop {
            let msg = ws.next().await.expect("stream open").expect("recv");
            if !(msg.is_binary() || msg.is_text()) {
                continue;
            }
            if let Frame::Notice { notice } = decode_envelope(msg).frame {
                if notice.text.starts_with(prefix) {
                    return notice;
                }
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(2), wait)
        .await
        .unwrap_or_else(|_| panic!("no notice starting with {prefix:?}"))
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_handshake_success() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let ack = handshake(&mut ws, 42, "neo").await;
    match ack.frame {
        Frame::HandshakeAck { actor_id, .. } => assert_eq!(actor_id, ActorId(42)),
        other => panic!("expected HandshakeAck, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_version_mismatch() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let hs = handshake_frame(999, TOKEN, 2, "neo");
    ws.send(encode_envelope(&hs)).await.expect("send");

    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    match env.frame {
        Frame::Error { code, .. } => assert_eq!(code, 400),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_wrong_token_unauthorized() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let hs = handshake_frame(PROTOCOL_VERSION, "guess", 2, "neo");
    ws.send(encode_envelope(&hs)).await.expect("send");

    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    match env.frame {
        Frame::Error { code, .. } => assert_eq!(code, 401),
        other => panic!("expected Error 401, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_actor_zero_unauthorized() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let hs = handshake_frame(PROTOCOL_VERSION, TOKEN, 0, "nobody");
    ws.send(encode_envelope(&hs)).await.expect("send");

    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    assert!(matches!(env.frame, Frame::Error { code: 401, .. }), "{env:?}");
}

#[tokio::test]
async fn test_handshake_non_handshake_first_message() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_frame(&mut ws, Frame::Heartbeat { client_time: 0 }).await;

    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    match env.frame {
        Frame::Error { code, .. } => assert_eq!(code, 400),
        other => panic!("expected Error 400, got {other:?}"),
    }
}

// =========================================================================
// Connection housekeeping
// =========================================================================

#[tokio::test]
async fn test_heartbeat_response() {
    let addr = start_server().await;
    let mut ws = join(&addr, 2, "neo").await;

    send_frame(&mut ws, Frame::Heartbeat { client_time: 12345 }).await;

    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    match env.frame {
        Frame::HeartbeatAck { client_time, .. } => assert_eq!(client_time, 12345),
        other => panic!("expected HeartbeatAck, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_closes_connection() {
    let addr = start_server().await;
    let mut ws = join(&addr, 2, "neo").await;

    send_frame(
        &mut ws,
        Frame::Disconnect {
            reason: "bye".into(),
        },
    )
    .await;

    let result = tokio::time::timeout(Duration::from_secs(2), ws.next()).await;
    match result {
        Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {}
        Ok(Some(Err(_))) => {}
        other => panic!("expected close, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_envelope_reports_error_and_keeps_connection() {
    let addr = start_server().await;
    let mut ws = join(&addr, 2, "neo").await;

    ws.send(Message::Binary(b"not json".to_vec().into()))
        .await
        .expect("send");
    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    assert!(matches!(env.frame, Frame::Error { code: 400, .. }), "{env:?}");

    send_frame(&mut ws, Frame::Heartbeat { client_time: 999 }).await;
    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    assert!(matches!(env.frame, Frame::HeartbeatAck { .. }));
}

#[tokio::test]
async fn test_unknown_command_is_ignored() {
    let addr = start_server().await;
    let mut ws = join(&addr, 2, "neo").await;

    command(&mut ws, "/dance").await;
    send_frame(&mut ws, Frame::Heartbeat { client_time: 7 }).await;

    // Nothing is sent for the unknown command, so the ack comes first.
    let env = decode_envelope(ws.next().await.unwrap().expect("recv"));
    assert!(
        matches!(env.frame, Frame::HeartbeatAck { client_time: 7, .. }),
        "{env:?}"
    );
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_entry_before_start_reports_waiting() {
    let addr = start_server().await;
    let mut ws = join(&addr, 2, "neo").await;

    send_intent(
        &mut ws,
        Intent::Entry {
            profile: Profile::default(),
        },
    )
    .await;

    let notice = expect_notice(&mut ws, "Game has").await;
    assert_eq!(notice.text, "Game has not started yet.");
}

#[tokio::test]
async fn test_start_command_uses_handshake_profile() {
    let addr = start_server().await;
    let mut admin = join(&addr, ADMIN, "morpheus").await;
    command(&mut admin, "/start").await;
    expect_notice(&mut admin, "Game has not started yet.").await;

    let mut neo = join(&addr, 2, "neo").await;
    command(&mut neo, "/start").await;
    expect_notice(&mut neo, "Game has not started yet.").await;

    let notice = expect_notice(&mut admin, "Player ").await;
    assert_eq!(notice.text, "Player @neo joined.");
}

#[tokio::test]
async fn test_menu_keyword_first_contact_uses_handshake_profile() {
    let addr = start_server().await;
    let mut admin = join(&addr, ADMIN, "morpheus").await;
    command(&mut admin, "/start").await;
    expect_notice(&mut admin, "Game has not started yet.").await;

    let mut neo = join(&addr, 2, "neo").await;
    send_intent(&mut neo, Intent::Text { text: "start".into() }).await;
    expect_notice(&mut neo, "Game has not started yet.").await;

    let notice = expect_notice(&mut admin, "Player ").await;
    assert_eq!(notice.text, "Player @neo joined.");
}

#[tokio::test]
async fn test_full_round_discover_and_kick() {
    let addr = start_server().await;
    let mut admin = join(&addr, ADMIN, "morpheus").await;
    let mut neo = join(&addr, 2, "neo").await;
    let mut trinity = join(&addr, 3, "trinity").await;

    for ws in [&mut admin, &mut neo, &mut trinity] {
        command(ws, "/start").await;
        expect_notice(ws, "Game has not started yet.").await;
    }

    // Non-admins are told when the round begins.
    command(&mut admin, "/start_game").await;
    expect_notice(&mut admin, "Game started!").await;
    expect_notice(&mut neo, "The game has started!").await;
    expect_notice(&mut trinity, "The game has started!").await;

    // The roster shows everyone's code.
    command(&mut admin, "/players").await;
    let roster = expect_notice(&mut admin, "@").await;
    let trinity_code = roster
        .text
        .lines()
        .find_map(|line| line.strip_prefix("@trinity "))
        .and_then(|rest| rest.split_whitespace().next())
        .expect("trinity in roster")
        .to_string();

    command(&mut neo, "/code").await;
    send_intent(&mut neo, Intent::Text { text: trinity_code }).await;
    expect_notice(&mut neo, "You discovered @trinity.").await;
    expect_notice(&mut trinity, "You discovered @neo.").await;

    command(&mut neo, "/list").await;
    let list = expect_notice(&mut neo, "Available opponents:").await;
    assert_eq!(list.options.len(), 1);
    assert_eq!(list.options[0].label, "@trinity");

    send_intent(
        &mut neo,
        Intent::Button {
            data: list.options[0].data.clone(),
        },
    )
    .await;
    let confirm = expect_notice(&mut neo, "Confirm kick?").await;
    assert_eq!(confirm.options.len(), 2);

    send_intent(
        &mut neo,
        Intent::Button {
            data: "confirm_kick".into(),
        },
    )
    .await;
    expect_notice(&mut neo, "You kicked @trinity.").await;
    expect_notice(&mut trinity, "You were kicked by @neo.").await;
    expect_notice(&mut admin, "@trinity is out of the game.").await;

    // The kicked player is out for good.
    command(&mut trinity, "/code").await;
    expect_notice(&mut trinity, "Game over.").await;
}
