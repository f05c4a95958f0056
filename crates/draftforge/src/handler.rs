//! Per-connection handler: decode commands, route them to the draft
//! service, and stream room events back out.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Split the socket; spawn a writer task draining this connection's
//!      event channel into the sink
//!   2. Loop: receive frames → decode a `ClientCommand` → dispatch
//!   3. On exit, leave every room the connection entered

use std::collections::HashSet;
use std::sync::Arc;

use draftforge_protocol::{
    ClientCommand, Codec, ConnectionId, ErrorCode, RoomCode, ServerEvent,
};
use draftforge_room::{DraftService, RoomError};
use draftforge_session::{EventReceiver, EventSender};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::DraftforgeError;
use crate::server::ServerState;

type WsStream = WebSocketStream<TcpStream>;
type WsSink = SplitSink<WsStream, Message>;

/// Drop guard that leaves every room the connection entered.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct RoomsGuard {
    connection: ConnectionId,
    rooms: HashSet<RoomCode>,
    service: DraftService,
}

impl Drop for RoomsGuard {
    fn drop(&mut self) {
        if self.rooms.is_empty() {
            return;
        }
        let connection = self.connection;
        let rooms = std::mem::take(&mut self.rooms);
        let service = self.service.clone();
        tokio::spawn(async move {
            for room_code in rooms {
                service.disconnect(&room_code, connection).await;
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    connection: ConnectionId,
    ws: WsStream,
    state: Arc<ServerState<C>>,
) -> Result<(), DraftforgeError>
where
    C: Codec + Clone + Send + Sync + 'static,
{
    tracing::debug!(%connection, "handling new connection");

    let (sink, mut stream) = ws.split();
    let (events, outbox) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(connection, sink, outbox, state.codec.clone()));

    let mut guard = RoomsGuard {
        connection,
        rooms: HashSet::new(),
        service: state.service.clone(),
    };

    while let Some(frame) = stream.next().await {
        let data = match frame {
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Close(_)) => {
                tracing::info!(%connection, "connection closed cleanly");
                break;
            }
            Ok(_) => continue, // ping/pong/frame
            Err(e) => {
                tracing::debug!(%connection, error = %e, "recv error");
                break;
            }
        };

        let command: ClientCommand = match state.codec.decode(&data) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(%connection, error = %e, "failed to decode command");
                send_error(&events, ErrorCode::BadRequest, e.to_string());
                continue;
            }
        };

        dispatch(&state.service, connection, &events, &mut guard.rooms, command).await;
    }

    drop(guard);
    drop(events);
    // The writer ends once the rooms release their copies of `events`.
    drop(writer);
    Ok(())
}

/// Routes one command. Lookup failures become an `error` event for this
/// connection only; refused turns are dropped silently.
async fn dispatch(
    service: &DraftService,
    connection: ConnectionId,
    events: &EventSender,
    rooms: &mut HashSet<RoomCode>,
    command: ClientCommand,
) {
    let result = match command {
        ClientCommand::Create {
            display_name,
            schema,
            durable_id,
        } => service
            .create(connection, events.clone(), display_name, schema, durable_id)
            .await
            .map(|joined| {
                rooms.insert(joined.room_code);
            }),

        ClientCommand::Join {
            room_code,
            display_name,
            durable_id,
            as_spectator,
        } => service
            .join(
                connection,
                events.clone(),
                &room_code,
                display_name,
                &durable_id,
                as_spectator,
            )
            .await
            .map(|joined| {
                rooms.insert(joined.room_code);
            }),

        ClientCommand::Rejoin {
            room_code,
            durable_id,
        } => service
            .rejoin(connection, events.clone(), &room_code, &durable_id)
            .await
            .map(|joined| {
                rooms.insert(joined.room_code);
            }),

        ClientCommand::SetReady { room_code } => service
            .set_ready(&room_code, connection)
            .await
            .map(|_| ()),

        ClientCommand::Submit {
            room_code,
            entity_id,
        } => service.submit(&room_code, connection, &entity_id).await,
    };

    if let Err(e) = result {
        report(events, connection, &e);
    }
}

fn report(events: &EventSender, connection: ConnectionId, error: &RoomError) {
    match error.client_code() {
        Some(code) => {
            tracing::debug!(%connection, ?code, %error, "command failed");
            send_error(events, code, error.to_string());
        }
        None => tracing::debug!(%connection, %error, "command ignored"),
    }
}

fn send_error(events: &EventSender, code: ErrorCode, message: String) {
    let _ = events.send(ServerEvent::Error { code, message });
}

/// Drains `outbox` into the socket until every sender is gone or the
/// socket fails. JSON goes out as text frames.
async fn write_events<C: Codec>(
    connection: ConnectionId,
    mut sink: WsSink,
    mut outbox: EventReceiver,
    codec: C,
) {
    while let Some(event) = outbox.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%connection, error = %e, "failed to encode event");
                continue;
            }
        };
        let frame = match String::from_utf8(bytes) {
            Ok(text) => Message::Text(text.into()),
            Err(raw) => Message::Binary(raw.into_bytes().into()),
        };
        if let Err(e) = sink.send(frame).await {
            tracing::debug!(%connection, error = %e, "send failed");
            break;
        }
    }
    let _ = sink.close().await;
}
