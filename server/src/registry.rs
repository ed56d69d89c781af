use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use system::ConnectionId;

/// Outbox of one connection. Frames are already encoded.
pub type ConnectionTx = tokio::sync::mpsc::Sender<String>;

static CONNECTION_ID_SOURCE: AtomicU64 = AtomicU64::new(1);

pub fn next_connection_id() -> ConnectionId {
    CONNECTION_ID_SOURCE.fetch_add(1, Ordering::Relaxed)
}

/// Live connections. Owned by the dispatcher task, which is the only place
/// membership is read or changed.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Returns `false` when the connection was already registered.
    pub fn register(&mut self, connection_id: ConnectionId, tx: ConnectionTx) -> bool {
        if self.connections.contains_key(&connection_id) {
            return false;
        }
        self.connections.insert(connection_id, tx);
        true
    }

    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connections.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&ConnectionId, &ConnectionTx),
    {
        for (connection_id, tx) in self.connections.iter() {
            f(connection_id, tx);
        }
    }
}
