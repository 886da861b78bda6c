//! Per-connection handler: handshake, auth, notice delivery, and intent routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive Handshake → validate version
//!   2. Authenticate token → get ActorId
//!   3. Send HandshakeAck → register the actor's route in the outbox
//!   4. Spawn a writer that drains the actor's notices into the socket
//!   5. Loop: receive envelopes → hand intents to the engine

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use codehunt_protocol::{Action, ActorId, Codec, Envelope, Frame, Profile, ProtocolError};
use codehunt_session::Authenticator;
use codehunt_store::Store;
use codehunt_transport::{Connection, ConnectionId, Outbox, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::{ServerState, HANDSHAKE_TIMEOUT, PROTOCOL_VERSION};
use crate::CodehuntError;

/// Drop guard that removes the actor's outbox route when the handler exits.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async lock.
struct RouteGuard {
    actor: ActorId,
    conn_id: ConnectionId,
    outbox: Outbox,
}

impl Drop for RouteGuard {
    fn drop(&mut self) {
        let (actor, conn_id, outbox) = (self.actor, self.conn_id, self.outbox.clone());
        tokio::spawn(async move {
            outbox.unregister(actor, conn_id).await;
        });
    }
}

/// Outbound frame bookkeeping shared by the reader loop and the writer task.
struct Outgoing {
    seq: AtomicU64,
    start: Instant,
}

impl Outgoing {
    fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    fn envelope(&self, frame: Frame) -> Envelope {
        Envelope::new(self.seq.fetch_add(1, Ordering::Relaxed), self.elapsed(), frame)
    }

    fn elapsed(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, A, C>>,
) -> Result<(), CodehuntError>
where
    S: Store,
    A: Authenticator,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let conn = Arc::new(conn);
    let out = Arc::new(Outgoing::new());

    // --- Step 1: Handshake ---
    let (actor, profile) = perform_handshake(&conn, &state, &out).await?;
    tracing::info!(%conn_id, %actor, "actor authenticated");

    // --- Step 2: Route notices to this connection ---
    let notices = state.outbox.register(actor, conn_id).await;
    let _guard = RouteGuard {
        actor,
        conn_id,
        outbox: state.outbox.clone(),
    };
    let writer = tokio::spawn(write_notices(
        Arc::clone(&conn),
        Arc::clone(&state),
        Arc::clone(&out),
        notices,
    ));

    // --- Step 3: Message loop ---
    let result = read_loop(&conn, &state, &out, actor, &profile).await;

    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::debug!(%actor, error = %e, "close failed");
    }
    // _guard drops here → route removed unless a newer connection owns it.
    result
}

async fn read_loop<S, A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<S, A, C>,
    out: &Outgoing,
    actor: ActorId,
    profile: &Profile,
) -> Result<(), CodehuntError>
where
    S: Store,
    A: Authenticator,
    C: Codec,
{
    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%actor, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::debug!(%actor, error = %e, "recv error");
                return Ok(());
            }
            Err(_) => {
                tracing::info!(%actor, "connection idle, closing");
                return Ok(());
            }
        };

        let envelope: Envelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%actor, error = %e, "failed to decode envelope");
                send_error(conn, state, out, 400, &format!("invalid frame: {e}")).await?;
                continue;
            }
        };

        match envelope.frame {
            Frame::Intent { intent } => {
                let action = match Action::parse(intent) {
                    Ok(action) => action,
                    Err(e) => {
                        tracing::debug!(%actor, error = %e, "ignoring unrecognized intent");
                        continue;
                    }
                };
                if let Err(e) = state.engine.perform_as(actor, action, profile).await {
                    tracing::debug!(%actor, error = %e, "intent failed");
                }
            }

            Frame::Heartbeat { client_time } => {
                let ack = out.envelope(Frame::HeartbeatAck {
                    client_time,
                    server_time: out.elapsed(),
                });
                send(conn, state, &ack).await?;
            }

            Frame::Disconnect { reason } => {
                tracing::info!(%actor, %reason, "client disconnected");
                return Ok(());
            }

            _ => {
                tracing::debug!(%actor, "ignoring unexpected frame");
            }
        }
    }
}

/// Drains the actor's notice queue into the socket until either side goes away.
async fn write_notices<S, A, C>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<S, A, C>>,
    out: Arc<Outgoing>,
    mut notices: mpsc::UnboundedReceiver<codehunt_protocol::Notice>,
) where
    S: Store,
    A: Authenticator,
    C: Codec,
{
    while let Some(notice) = notices.recv().await {
        let envelope = out.envelope(Frame::Notice { notice });
        if let Err(e) = send(&conn, &state, &envelope).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "notice delivery failed");
            break;
        }
    }
}

/// Performs the initial handshake: receive Handshake, validate, auth, send Ack.
async fn perform_handshake<S, A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<S, A, C>,
    out: &Outgoing,
) -> Result<(ActorId, Profile), CodehuntError>
where
    S: Store,
    A: Authenticator,
    C: Codec,
{
    let data = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage("connection closed before handshake".into()).into());
        }
        Ok(Err(e)) => return Err(CodehuntError::Transport(e)),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("handshake timed out".into()).into());
        }
    };

    let envelope: Envelope = state.codec.decode(&data)?;

    let (version, token, actor_id, profile) = match envelope.frame {
        Frame::Handshake {
            version,
            token,
            actor_id,
            profile,
        } => (version, token, actor_id, profile),
        _ => {
            send_error(conn, state, out, 400, "expected Handshake").await?;
            return Err(ProtocolError::InvalidMessage("first frame must be Handshake".into()).into());
        }
    };

    if version != PROTOCOL_VERSION {
        send_error(
            conn,
            state,
            out,
            400,
            &format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
        )
        .await?;
        return Err(ProtocolError::InvalidMessage("protocol version mismatch".into()).into());
    }

    let actor = match state.auth.authenticate(&token, actor_id).await {
        Ok(actor) => actor,
        Err(e) => {
            send_error(conn, state, out, 401, "unauthorized").await?;
            return Err(CodehuntError::Session(e));
        }
    };

    let ack = out.envelope(Frame::HandshakeAck {
        actor_id: actor,
        server_time: out.elapsed(),
    });
    send(conn, state, &ack).await?;

    Ok((actor, profile))
}

async fn send<S, A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<S, A, C>,
    envelope: &Envelope,
) -> Result<(), CodehuntError>
where
    S: Store,
    A: Authenticator,
    C: Codec,
{
    let bytes = state.codec.encode(envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends a `Frame::Error` envelope to the client.
async fn send_error<S, A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<S, A, C>,
    out: &Outgoing,
    code: u16,
    message: &str,
) -> Result<(), CodehuntError>
where
    S: Store,
    A: Authenticator,
    C: Codec,
{
    let envelope = out.envelope(Frame::Error {
        code,
        message: message.to_string(),
    });
    send(conn, state, &envelope).await
}
