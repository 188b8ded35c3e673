//! The session hub (`spec.md §4.G`, `§5`).
//!
//! The active session set and the (informational-only) token index are
//! owned exclusively by a single control-loop task, guarded by one
//! read/write lock — writers are only ever the control loop, reached
//! through the bounded `commands` channel, so the fan-out path below never
//! contends with register/unregister. A second task owns the broadcast
//! channel and is the sole writer to every session's outbox from the
//! broadcast side; it enqueues non-blockingly and skips (never blocks on)
//! a session whose outbox is full.

use std::{collections::HashMap, sync::Arc};

use click_counter_logic::{metrics, services::ratelimit::RateLimiter, types::ServerFrame};
use tokio::sync::RwLock;
use uuid::Uuid;

struct SessionEntry {
    token: Uuid,
    outbox: async_channel::Sender<ServerFrame>,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, SessionEntry>,
    /// `token -> session id`. Never consulted on the hot path (§9 Open
    /// Question resolution in `DESIGN.md`) — kept only so a future
    /// reconnect-by-token feature has somewhere to read from.
    tokens: HashMap<Uuid, Uuid>,
}

enum HubCommand {
    Register(Uuid, SessionEntry),
    Unregister(Uuid),
}

/// A freshly registered session handle, returned to the caller that
/// accepted the upgrade (`spec.md §4.G` Upgrade step).
pub struct JoinedSession {
    pub id: Uuid,
    pub token: Uuid,
    pub outbox: async_channel::Sender<ServerFrame>,
    pub outbox_rx: async_channel::Receiver<ServerFrame>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Cheaply cloneable handle to the hub's control and broadcast channels.
#[derive(Clone)]
pub struct HubHandle {
    commands: async_channel::Sender<HubCommand>,
    broadcast: async_channel::Sender<ServerFrame>,
}

impl HubHandle {
    /// Spawns the control loop and broadcast loop tasks (`spec.md §5`) and
    /// returns a handle to both.
    pub fn spawn(broadcast_capacity: usize) -> Self {
        let registry = Arc::new(RwLock::new(Registry::default()));
        let (commands_tx, commands_rx) = async_channel::unbounded::<HubCommand>();
        let (broadcast_tx, broadcast_rx) = async_channel::bounded::<ServerFrame>(broadcast_capacity);

        tokio::spawn(control_loop(registry.clone(), commands_rx));
        tokio::spawn(broadcast_loop(registry, broadcast_rx));

        Self {
            commands: commands_tx,
            broadcast: broadcast_tx,
        }
    }

    /// Mints a token, creates the session's outbox, and registers it
    /// through the control channel. The caller pushes `auth_token` onto
    /// the returned outbox itself, guaranteeing it is the first frame
    /// written by the per-session outbound task.
    pub async fn register(&self, outbox_capacity: usize, rate_limit_cap: u32) -> JoinedSession {
        let id = Uuid::new_v4();
        let token = Uuid::new_v4();
        let (outbox_tx, outbox_rx) = async_channel::bounded(outbox_capacity);
        let rate_limiter = Arc::new(RateLimiter::new(rate_limit_cap));

        let entry = SessionEntry {
            token,
            outbox: outbox_tx.clone(),
        };
        if self.commands.send(HubCommand::Register(id, entry)).await.is_err() {
            tracing::error!("hub control loop is gone, session registered nowhere");
        }

        JoinedSession {
            id,
            token,
            outbox: outbox_tx,
            outbox_rx,
            rate_limiter,
        }
    }

    /// Removes the session from the active set and token index. The
    /// session's own outbox must be closed separately by the caller so the
    /// outbound task drains and exits (`spec.md §4.G` Close step).
    pub async fn unregister(&self, id: Uuid) {
        let _ = self.commands.send(HubCommand::Unregister(id)).await;
    }

    /// Enqueues a broadcast frame (e.g. `counter_update` from
    /// `POST /internal/broadcast`). Non-blocking: if the broadcast channel
    /// itself is saturated (the fan-out loop is falling behind), the frame
    /// is dropped and logged rather than blocking the caller.
    pub fn broadcast(&self, frame: ServerFrame) {
        if self.broadcast.try_send(frame).is_err() {
            tracing::warn!("broadcast channel full, dropping counter_update");
        }
    }
}

async fn control_loop(registry: Arc<RwLock<Registry>>, commands: async_channel::Receiver<HubCommand>) {
    while let Ok(command) = commands.recv().await {
        match command {
            HubCommand::Register(id, entry) => {
                let mut registry = registry.write().await;
                registry.tokens.insert(entry.token, id);
                registry.sessions.insert(id, entry);
            }
            HubCommand::Unregister(id) => {
                let mut registry = registry.write().await;
                if let Some(entry) = registry.sessions.remove(&id) {
                    registry.tokens.remove(&entry.token);
                }
            }
        }
    }
}

async fn broadcast_loop(registry: Arc<RwLock<Registry>>, broadcast: async_channel::Receiver<ServerFrame>) {
    while let Ok(frame) = broadcast.recv().await {
        let registry = registry.read().await;
        for entry in registry.sessions.values() {
            if entry.outbox.try_send(frame.clone()).is_ok() {
                metrics::BROADCAST_FANOUT_TOTAL.inc();
            } else {
                metrics::BROADCAST_DROPPED_TOTAL.inc();
            }
        }
    }
}
