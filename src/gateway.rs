use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::types::{Delivery, QueuePolicy, Target};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

/// Sending half of a client's queues. `control` has its own slot so a close
/// frame still gets through when `outbound` is full.
#[derive(Clone, Debug)]
pub struct ClientLink {
    pub outbound: mpsc::Sender<OutboundMessage>,
    pub control: mpsc::Sender<OutboundMessage>,
}

/// Receiving half, drained by the connection's writer task.
#[derive(Debug)]
pub struct ClientInbox {
    pub outbound: mpsc::Receiver<OutboundMessage>,
    pub control: mpsc::Receiver<OutboundMessage>,
}

pub fn client_link(capacity: usize) -> (ClientLink, ClientInbox) {
    let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
    let (control_tx, control_rx) = mpsc::channel(1);
    (
        ClientLink {
            outbound: outbound_tx,
            control: control_tx,
        },
        ClientInbox {
            outbound: outbound_rx,
            control: control_rx,
        },
    )
}

/// Per-client outbound queues. The only place protocol frames leave the game.
#[derive(Debug, Default)]
pub struct Gateway {
    clients: HashMap<String, ClientLink>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, client_id: &str, link: ClientLink) {
        self.clients.insert(client_id.to_string(), link);
    }

    /// Forgets the client. Its writer task drains what is queued and exits
    /// once the last sender is gone.
    pub fn unregister(&mut self, client_id: &str) -> bool {
        self.clients.remove(client_id).is_some()
    }

    /// Unregisters the client and asks its writer to close the socket.
    pub fn kick(&mut self, client_id: &str, code: u16, reason: &str) {
        if let Some(link) = self.clients.remove(client_id) {
            let close = OutboundMessage::Close {
                code,
                reason: reason.to_string(),
            };
            if link.control.try_send(close).is_err() {
                tracing::debug!(client_id, "close frame not queued, writer already gone");
            }
        }
    }

    /// Serializes the message once and queues it for every addressed client.
    ///
    /// Returns the clients whose queue rejected a message that must not be
    /// dropped; the caller is expected to disconnect them.
    pub fn dispatch(&self, delivery: &Delivery) -> Vec<String> {
        let payload = match serde_json::to_string(&delivery.message) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(%error, "failed to serialize outbound message");
                return Vec::new();
            }
        };
        let policy = delivery.message.queue_policy();

        let mut failed = Vec::new();
        match &delivery.target {
            Target::Only(client_id) => {
                if let Some(link) = self.clients.get(client_id) {
                    if !try_queue(client_id, &link.outbound, payload, policy) {
                        failed.push(client_id.clone());
                    }
                }
            }
            target => {
                for (client_id, link) in &self.clients {
                    if !target.includes(client_id) {
                        continue;
                    }
                    if !try_queue(client_id, &link.outbound, payload.clone(), policy) {
                        failed.push(client_id.clone());
                    }
                }
            }
        }
        failed
    }
}

/// Returns `false` only when the failure should cost the client its session.
fn try_queue(
    client_id: &str,
    tx: &mpsc::Sender<OutboundMessage>,
    payload: String,
    policy: QueuePolicy,
) -> bool {
    match tx.try_send(OutboundMessage::Text(payload)) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) if policy == QueuePolicy::DropOnFull => {
            tracing::debug!(client_id, "outbound queue full, dropping frame");
            true
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(client_id, "outbound queue full, disconnecting client");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}
