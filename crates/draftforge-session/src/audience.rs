//! Event fan-out to every connection watching a room.
//!
//! Each connection hands the room the sending half of an unbounded mpsc
//! channel; the gateway drains the receiving half into the socket. Sends
//! never wait, so a slow client can't stall the draft. A send that fails
//! means the receiver is gone, and that subscriber is pruned.

use std::collections::HashMap;

use draftforge_protocol::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;

/// Sending half handed to a room by each connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
/// Receiving half kept by the connection's writer task.
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// The subscribers of one room.
#[derive(Debug, Default)]
pub struct Audience {
    subscribers: HashMap<ConnectionId, EventSender>,
}

impl Audience {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the subscriber for `connection`.
    pub fn subscribe(&mut self, connection: ConnectionId, sender: EventSender) {
        self.subscribers.insert(connection, sender);
    }

    /// Removes `connection`. Returns `true` if it was subscribed.
    pub fn unsubscribe(&mut self, connection: ConnectionId) -> bool {
        self.subscribers.remove(&connection).is_some()
    }

    /// Sends `event` to one subscriber.
    pub fn send_to(&mut self, connection: ConnectionId, event: ServerEvent) {
        let closed = match self.subscribers.get(&connection) {
            Some(sender) => sender.send(event).is_err(),
            None => return,
        };
        if closed {
            tracing::debug!(%connection, "pruning closed subscriber");
            self.subscribers.remove(&connection);
        }
    }

    /// Sends `event` to every subscriber, dropping the ones whose
    /// receiver has gone away.
    pub fn publish(&mut self, event: &ServerEvent) {
        self.subscribers.retain(|connection, sender| {
            let open = sender.send(event.clone()).is_ok();
            if !open {
                tracing::debug!(%connection, "pruning closed subscriber");
            }
            open
        });
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
