//! The single long-lived AMS/TCP transport: framing, InvokeId multiplexing,
//! and reconnect-with-backoff, built on [`tcads_core::io::tokio`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tcads_core::ads::{AdsCommand, AdsHeader, AdsReturnCode, StateFlag};
use tcads_core::ams::{AmsAddr, AmsCommand, AmsNetId};
use tcads_core::io::frame::AmsFrame;
use tcads_core::io::tokio::{AmsReader, AmsStream, AmsWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{ClientError, Result};
use crate::events::{ClientEvent, EventHub};
use crate::settings::ClientSettings;

/// A decoded ADS-layer frame: the 32-byte header plus its command-specific body.
#[derive(Debug, Clone)]
pub struct AdsFrame {
    pub header: AdsHeader,
    pub body: Vec<u8>,
}

/// Resolved addresses assigned by the router during [`AdsSession::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub local: AmsAddr,
    pub target: AmsAddr,
}

struct Pending {
    writer: Mutex<AmsWriter<OwnedWriteHalf>>,
    reader_task: JoinHandle<()>,
}

struct Shared {
    router_addr: SocketAddr,
    local_ads_port: Option<u16>,
    target_ams_net_id: AmsNetId,
    target_ads_port: u16,
    settings_timeout: Duration,
    reconnect_interval: Duration,
    auto_reconnect: bool,
    max_frame_len: usize,
    hide_console_warnings: bool,
    events: Arc<EventHub>,
    pending: Mutex<HashMap<u32, oneshot::Sender<AdsFrame>>>,
    next_invoke_id: AtomicU32,
    connection: Mutex<Option<Connection>>,
    io: Mutex<Option<Pending>>,
    notifications: mpsc::UnboundedSender<AdsFrame>,
}

/// Owns the byte channel to the ADS router: writes outgoing frames, reads
/// incoming ones, and routes each by command id + InvokeId to whichever
/// caller is waiting, or hands it to the notification channel.
#[derive(Clone)]
pub struct AdsSession {
    shared: Arc<Shared>,
}

impl AdsSession {
    /// Builds a session that is not yet connected. `notifications` receives
    /// every `AdsDeviceNotification` frame the reader observes; the caller
    /// (typically [`crate::client::Client`]) owns decoding and dispatch.
    pub fn new(
        settings: &ClientSettings,
        router_addr: SocketAddr,
        events: Arc<EventHub>,
        notifications: mpsc::UnboundedSender<AdsFrame>,
    ) -> Self {
        let shared = Shared {
            router_addr,
            local_ads_port: settings.local_ads_port,
            target_ams_net_id: settings.target_ams_net_id,
            target_ads_port: settings.target_ads_port,
            settings_timeout: settings.timeout,
            reconnect_interval: settings.reconnect_interval,
            auto_reconnect: settings.auto_reconnect,
            max_frame_len: settings.max_frame_len,
            hide_console_warnings: settings.hide_console_warnings,
            events,
            pending: Mutex::new(HashMap::new()),
            next_invoke_id: AtomicU32::new(1),
            connection: Mutex::new(None),
            io: Mutex::new(None),
            notifications,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// The router-registration handshake: dials `router_addr`, sends TCP
    /// command id 1 (Port Connect) with the desired local AMS port (or an
    /// empty payload to ask for a dynamic one), and stores the assigned
    /// local/target addresses.
    pub async fn connect(&self) -> Result<Connection> {
        let stream = TcpStream::connect(self.shared.router_addr).await?;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();
        let reader = AmsReader::with_max_frame_len(read_half, self.shared.max_frame_len);
        let mut writer = AmsWriter::new(write_half);

        let request_payload: Vec<u8> = match self.shared.local_ads_port {
            Some(port) => port.to_le_bytes().to_vec(),
            None => Vec::new(),
        };
        writer
            .write_frame(&AmsFrame::new(AmsCommand::PortConnect, request_payload))
            .await?;

        let mut bootstrap_reader = reader;
        let response = read_raw_frame(&mut bootstrap_reader).await?;
        if response.header().command() != AmsCommand::PortConnect {
            return Err(ClientError::UnexpectedResponse);
        }
        let payload = response.payload();
        if payload.len() < 8 {
            return Err(ClientError::UnexpectedResponse);
        }
        let mut net_id_bytes = [0u8; 6];
        net_id_bytes.copy_from_slice(&payload[0..6]);
        let local_net_id = AmsNetId::from_bytes(net_id_bytes);
        let local_port = u16::from_le_bytes(payload[6..8].try_into().unwrap());

        let connection = Connection {
            local: AmsAddr::new(local_net_id, local_port),
            target: AmsAddr::new(self.shared.target_ams_net_id, self.shared.target_ads_port),
        };

        let reader_task = tokio::spawn(reader_loop(bootstrap_reader, self.shared.clone()));
        *self.shared.io.lock().await = Some(Pending {
            writer: Mutex::new(writer),
            reader_task,
        });
        *self.shared.connection.lock().await = Some(connection);

        self.shared.events.emit(ClientEvent::Connect);
        Ok(connection)
    }

    /// Tears down the transport. Any outstanding [`AdsSession::send_command`]
    /// calls fail with [`ClientError::Disconnected`].
    pub async fn disconnect(&self) {
        if let Some(pending) = self.shared.io.lock().await.take() {
            pending.reader_task.abort();
        }
        *self.shared.connection.lock().await = None;
        self.fail_all_pending().await;
        self.shared.events.emit(ClientEvent::Disconnect);
    }

    /// `disconnect()` followed by `connect()`.
    pub async fn reconnect(&self) -> Result<Connection> {
        self.disconnect().await;
        let connection = self.connect().await?;
        self.shared.events.emit(ClientEvent::Reconnect);
        Ok(connection)
    }

    /// Spawns the exponential-backoff reconnect loop used after an
    /// unexpected disconnect. Runs until it succeeds; there is no cap on
    /// attempts, only on the delay between them.
    pub(crate) fn spawn_auto_reconnect(&self) {
        if !self.shared.auto_reconnect {
            return;
        }
        let session = self.clone();
        tokio::spawn(async move {
            let mut delay = Duration::from_secs(1);
            let cap = Duration::from_secs(30);
            loop {
                tokio::time::sleep(delay).await;
                match session.connect().await {
                    Ok(_) => {
                        session.shared.events.emit(ClientEvent::Reconnect);
                        return;
                    }
                    Err(err) => {
                        session.shared.events.warn(
                            session.shared.hide_console_warnings,
                            format!("reconnect attempt failed: {err}"),
                        );
                        delay = (delay * 2).min(cap);
                    }
                }
            }
        });
    }

    pub fn is_connected(&self) -> bool {
        self.shared.io.try_lock().map(|g| g.is_some()).unwrap_or(true)
    }

    pub async fn connection(&self) -> Option<Connection> {
        *self.shared.connection.lock().await
    }

    pub(crate) fn events(&self) -> &Arc<EventHub> {
        &self.shared.events
    }

    pub(crate) fn hide_console_warnings(&self) -> bool {
        self.shared.hide_console_warnings
    }

    fn next_invoke_id(&self) -> u32 {
        loop {
            let id = self.shared.next_invoke_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
            // 0 is reserved for "none"; skip the wrap-to-zero tick.
            self.shared.next_invoke_id.store(1, Ordering::Relaxed);
        }
    }

    /// Drops every pending response channel, which fails each waiting
    /// `send_command` call with `ClientError::Disconnected`.
    async fn fail_all_pending(&self) {
        self.shared.pending.lock().await.clear();
    }

    /// Sends one ADS command to the configured target and awaits its
    /// response, the per-call timeout, or a disconnect — whichever resolves first.
    pub async fn send_command(&self, command_id: AdsCommand, body: Vec<u8>) -> Result<AdsFrame> {
        self.send_command_to(self.target().await?, command_id, body)
            .await
    }

    /// As [`AdsSession::send_command`], but against an explicit target
    /// address rather than the client's configured target.
    pub async fn send_command_to(
        &self,
        target: AmsAddr,
        command_id: AdsCommand,
        body: Vec<u8>,
    ) -> Result<AdsFrame> {
        let connection = self
            .shared
            .connection
            .lock()
            .await
            .ok_or(ClientError::NotConnected)?;
        let invoke_id = self.next_invoke_id();

        let header = AdsHeader::new(
            target,
            connection.local,
            command_id,
            StateFlag::tcp_ads_request(),
            body.len() as u32,
            AdsReturnCode::Ok,
            invoke_id,
        );
        let mut payload = header.to_bytes().to_vec();
        payload.extend_from_slice(&body);
        let frame = AmsFrame::new(AmsCommand::AdsCommand, payload);

        let (tx, rx) = oneshot::channel();
        self.shared.pending.lock().await.insert(invoke_id, tx);

        let write_result = {
            let io = self.shared.io.lock().await;
            match io.as_ref() {
                Some(pending) => pending.writer.lock().await.write_frame(&frame).await,
                None => {
                    self.shared.pending.lock().await.remove(&invoke_id);
                    return Err(ClientError::NotConnected);
                }
            }
        };
        if let Err(err) = write_result {
            self.shared.pending.lock().await.remove(&invoke_id);
            return Err(ClientError::Io(err));
        }

        let response = tokio::time::timeout(self.shared.settings_timeout, rx).await;
        match response {
            Ok(Ok(frame)) => {
                if frame.header.error_code() != AdsReturnCode::Ok {
                    return Err(ClientError::Ads {
                        code: frame.header.error_code(),
                    });
                }
                Ok(frame)
            }
            Ok(Err(_)) => Err(ClientError::Disconnected),
            Err(_) => {
                self.shared.pending.lock().await.remove(&invoke_id);
                Err(ClientError::Timeout)
            }
        }
    }

    async fn target(&self) -> Result<AmsAddr> {
        self.shared
            .connection
            .lock()
            .await
            .map(|c| c.target)
            .ok_or(ClientError::NotConnected)
    }
}

async fn read_raw_frame(reader: &mut AmsReader<OwnedReadHalf>) -> Result<AmsFrame> {
    Ok(reader.read_frame().await?)
}

/// The sole consumer of the transport's input stream: decodes each whole
/// frame, matches `response`-flagged ADS frames by InvokeId, and forwards
/// unsolicited `AdsDeviceNotification` frames (and anything else) onward.
async fn reader_loop(mut reader: AmsReader<OwnedReadHalf>, shared: Arc<Shared>) {
    loop {
        let frame = match reader.read_frame().await {
            Ok(frame) => frame,
            Err(err) => {
                debug!("ads reader loop ended: {err}");
                *shared.connection.lock().await = None;
                *shared.io.lock().await = None;
                let mut pending = shared.pending.lock().await;
                pending.clear();
                drop(pending);
                shared.events.emit(ClientEvent::Disconnect);
                return;
            }
        };

        if frame.header().command() != AmsCommand::AdsCommand {
            warn!("dropping non-ADS AMS frame: {:?}", frame.header().command());
            continue;
        }
        let payload = frame.payload();
        if payload.len() < 32 {
            shared
                .events
                .warn(shared.hide_console_warnings, "short ADS frame dropped");
            continue;
        }
        let header_bytes: [u8; 32] = payload[0..32].try_into().unwrap();
        let header = AdsHeader::from_bytes(header_bytes);
        let body = payload[32..].to_vec();
        let ads_frame = AdsFrame { header, body };

        if ads_frame.header.state_flags().is_response() {
            let invoke_id = ads_frame.header.invoke_id();
            let mut pending = shared.pending.lock().await;
            if let Some(tx) = pending.remove(&invoke_id) {
                drop(pending);
                let _ = tx.send(ads_frame);
                continue;
            }
            drop(pending);
            warn!("response for unknown invoke id {invoke_id}");
            continue;
        }

        if ads_frame.header.command_id() == AdsCommand::AdsDeviceNotification {
            let _ = shared.notifications.send(ads_frame);
            continue;
        }

        warn!("unexpected unsolicited frame: {:?}", ads_frame.header.command_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcads_core::ads::AdsReturnCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_settings(port: u16) -> ClientSettings {
        ClientSettings::new(AmsNetId::new(127, 0, 0, 1, 1, 1), port)
    }

    fn make_session(router_addr: SocketAddr) -> (AdsSession, mpsc::UnboundedReceiver<AdsFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = AdsSession::new(
            &test_settings(851),
            router_addr,
            Arc::new(EventHub::new()),
            tx,
        );
        (session, rx)
    }

    #[test]
    fn test_invoke_id_wraps_to_one_and_skips_zero() {
        let (session, _rx) = make_session("127.0.0.1:0".parse().unwrap());
        session
            .shared
            .next_invoke_id
            .store(u32::MAX, Ordering::Relaxed);
        assert_eq!(session.next_invoke_id(), u32::MAX);
        assert_eq!(session.next_invoke_id(), 1);
        assert_eq!(session.next_invoke_id(), 2);
    }

    /// A minimal fake router: completes the Port Connect handshake, then
    /// echoes every ADS command back as an ADS-OK response carrying the
    /// same invoke id and the payload `echo`.
    async fn spawn_fake_router(echo: Vec<u8>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut stream = AmsStream::new(&mut socket);

            let connect_req = stream.read_frame().await.unwrap();
            assert_eq!(connect_req.header().command(), AmsCommand::PortConnect);
            let mut response = Vec::new();
            response.extend_from_slice(&AmsNetId::new(127, 0, 0, 1, 1, 1).to_bytes());
            response.extend_from_slice(&30000u16.to_le_bytes());
            stream
                .write_frame(&AmsFrame::new(AmsCommand::PortConnect, response))
                .await
                .unwrap();

            loop {
                let frame = match stream.read_frame().await {
                    Ok(f) => f,
                    Err(_) => return,
                };
                if frame.header().command() != AmsCommand::AdsCommand {
                    continue;
                }
                let incoming = frame.payload();
                let header = AdsHeader::from_bytes(incoming[0..32].try_into().unwrap());
                let response_header = AdsHeader::new(
                    *header.source(),
                    *header.target(),
                    header.command_id(),
                    StateFlag::tcp_ads_response(),
                    echo.len() as u32,
                    AdsReturnCode::Ok,
                    header.invoke_id(),
                );
                let mut response_payload = response_header.to_bytes().to_vec();
                response_payload.extend_from_slice(&echo);
                stream
                    .write_frame(&AmsFrame::new(AmsCommand::AdsCommand, response_payload))
                    .await
                    .unwrap();
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_connect_assigns_local_address() {
        let addr = spawn_fake_router(vec![]).await;
        let (session, _rx) = make_session(addr);
        let connection = session.connect().await.unwrap();
        assert_eq!(connection.local.net_id(), AmsNetId::new(127, 0, 0, 1, 1, 1));
        assert_eq!(connection.local.port(), 30000);
    }

    #[tokio::test]
    async fn test_send_command_round_trips_payload() {
        let addr = spawn_fake_router(vec![0xAA, 0xBB]).await;
        let (session, _rx) = make_session(addr);
        session.connect().await.unwrap();

        let response = session
            .send_command(AdsCommand::AdsRead, vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(response.body, vec![0xAA, 0xBB]);
    }

    #[tokio::test]
    async fn test_send_command_without_connection_fails_fast() {
        let (session, _rx) = make_session("127.0.0.1:1".parse().unwrap());
        let err = session.send_command(AdsCommand::AdsRead, vec![]).await;
        assert!(matches!(err, Err(ClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_disconnect_fails_outstanding_sends() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut stream = AmsStream::new(&mut socket);
            let _ = stream.read_frame().await.unwrap();
            let mut response = Vec::new();
            response.extend_from_slice(&AmsNetId::new(127, 0, 0, 1, 1, 1).to_bytes());
            response.extend_from_slice(&30000u16.to_le_bytes());
            stream
                .write_frame(&AmsFrame::new(AmsCommand::PortConnect, response))
                .await
                .unwrap();
            // Never answer the ADS request that follows; hang up instead.
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut buf = [0u8; 1];
            let _ = socket.read(&mut buf).await;
            let _ = socket.shutdown().await;
        });

        let (session, _rx) = make_session(addr);
        session.connect().await.unwrap();
        let err = session.send_command(AdsCommand::AdsRead, vec![1]).await;
        assert!(matches!(err, Err(ClientError::Disconnected)));
    }
}
