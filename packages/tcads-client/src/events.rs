//! Typed event broadcast for connection lifecycle and diagnostic notices.
//!
//! The protocol's "general pub/sub" surface is narrowed here to a single
//! [`ClientEvent`] enum fanned out over a `tokio::sync::broadcast` channel;
//! callers that want `on_connect`/`on_warning`-style narrow subscriptions
//! can filter the stream returned by [`EventHub::subscribe`].

use tcads_core::ads::AdsState;
use tokio::sync::broadcast;

/// One of the lifecycle/diagnostic events a [`Client`](crate::client::Client) emits.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The transport finished its router-registration handshake.
    Connect,
    /// The transport was torn down, deliberately or otherwise.
    Disconnect,
    /// An automatic reconnect completed after an unexpected disconnect.
    Reconnect,
    /// A non-fatal notice: an orphaned notification handle, a symbol-version
    /// bump, a failed re-subscribe after reconnect, and so on.
    Warning(String),
    /// The target PLC runtime's [`AdsState`] changed.
    PlcRuntimeStateChange(AdsState),
    /// The target TwinCAT system's [`AdsState`] changed.
    TcSystemStateChange(AdsState),
    /// The PLC's symbol table was replaced by a new download.
    SymbolVersionChange(u8),
}

/// Broadcasts [`ClientEvent`]s to any number of subscribers.
///
/// Dropped receivers are pruned lazily by `tokio::sync::broadcast`; a send
/// with no live subscribers is simply discarded, which is why [`EventHub::emit`]
/// ignores the `Err` returned by `Sender::send`.
pub struct EventHub {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(128);
        Self { tx }
    }

    /// Subscribes to the event stream. Events emitted before this call are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }

    /// Emits a [`ClientEvent::Warning`]; the event itself always fires.
    /// `hide_console_warnings` gates only the additional `tracing::warn!` echo.
    pub(crate) fn warn(&self, hide_console_warnings: bool, message: impl Into<String>) {
        let message = message.into();
        self.emit(ClientEvent::Warning(message.clone()));
        if !hide_console_warnings {
            tracing::warn!("{message}");
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
