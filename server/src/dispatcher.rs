use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{encode, ConnectionId, Message};

use crate::registry::{ConnectionRegistry, ConnectionTx};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("broadcast dispatcher is no longer running")]
    DispatcherClosed,
}

#[derive(Debug)]
pub enum DispatcherCommand {
    Register {
        connection_id: ConnectionId,
        tx: ConnectionTx,
    },
    Unregister {
        connection_id: ConnectionId,
    },
    Broadcast(Message),
}

/// Sending side of the dispatcher queue. Commands are applied strictly in
/// the order they were sent, across all handles.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    cmd_tx: UnboundedSender<DispatcherCommand>,
}

impl DispatcherHandle {
    pub fn register(
        &self,
        connection_id: ConnectionId,
        tx: ConnectionTx,
    ) -> Result<(), RelayError> {
        self.send(DispatcherCommand::Register { connection_id, tx })
    }

    pub fn unregister(&self, connection_id: ConnectionId) -> Result<(), RelayError> {
        self.send(DispatcherCommand::Unregister { connection_id })
    }

    pub fn broadcast(&self, message: Message) -> Result<(), RelayError> {
        self.send(DispatcherCommand::Broadcast(message))
    }

    fn send(&self, command: DispatcherCommand) -> Result<(), RelayError> {
        self.cmd_tx
            .send(command)
            .map_err(|_| RelayError::DispatcherClosed)
    }
}

struct Dispatcher {
    registry: ConnectionRegistry,
}

impl Dispatcher {
    fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    fn handle_command(&mut self, command: DispatcherCommand) {
        match command {
            DispatcherCommand::Register { connection_id, tx } => {
                if self.registry.register(connection_id, tx) {
                    log::info!(
                        "Connection {} registered ({} live)",
                        connection_id,
                        self.registry.len()
                    );
                }
            }
            DispatcherCommand::Unregister { connection_id } => {
                if self.registry.unregister(&connection_id).is_some() {
                    log::info!(
                        "Connection {} unregistered ({} live)",
                        connection_id,
                        self.registry.len()
                    );
                }
            }
            DispatcherCommand::Broadcast(message) => self.broadcast(&message),
        }
    }

    /// Offers the encoded message to every member without waiting. A member
    /// whose outbox is full or closed is dropped from the registry; its
    /// connection closes once the outbox drains and the client resyncs on
    /// reconnect.
    fn broadcast(&mut self, message: &Message) {
        let frame = encode(message);
        log::debug!(
            "Egress {} to {} connections",
            message.kind(),
            self.registry.len()
        );

        let mut failed = Vec::new();
        self.registry
            .for_each(|connection_id, tx| match tx.try_send(frame.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!(
                        "Failed to write {} to connection {}: outbox full, disconnecting",
                        message.kind(),
                        connection_id
                    );
                    failed.push(*connection_id);
                }
                Err(TrySendError::Closed(_)) => {
                    log::warn!(
                        "Failed to write {} to connection {}: closed",
                        message.kind(),
                        connection_id
                    );
                    failed.push(*connection_id);
                }
            });

        for connection_id in failed {
            self.registry.unregister(&connection_id);
        }
    }
}

pub fn spawn_dispatcher() -> DispatcherHandle {
    let (cmd_tx, mut cmd_rx) = unbounded_channel::<DispatcherCommand>();

    tokio::spawn(async move {
        let mut dispatcher = Dispatcher::new();
        log::info!("dispatcher - started");
        while let Some(command) = cmd_rx.recv().await {
            dispatcher.handle_command(command);
        }
        log::info!("dispatcher - terminated");
    });

    DispatcherHandle { cmd_tx }
}
