//! The public facade: thin shells over the session, cache, converter,
//! subscription manager, and sum-command multiplexer that do just enough
//! wiring to turn a symbol path into a decoded [`Value`] and back.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tcads_core::ads::{
    AdsCommand, AdsDeviceVersion, AdsReturnCode, AdsState, AdsString, AdsTransMode, DataType,
    IndexGroup, IndexOffset, ReservedIndexGroup, SymbolInfo,
};
use tcads_core::command::{
    AdsDeviceInfoResponse, AdsReadRequest, AdsReadResponse, AdsReadStateResponse,
    AdsReadWriteRequest, AdsWriteControlRequest, AdsWriteControlResponse, AdsWriteRequest,
    AdsWriteResponse,
};
use tokio::sync::{broadcast, mpsc};

use crate::cache::MetaCache;
use crate::convert::{self, Value};
use crate::errors::{ClientError, Result};
use crate::events::ClientEvent;
use crate::session::AdsSession;
use crate::settings::ClientSettings;
use crate::subscription::{SampleCallback, SubscriptionHandle, SubscriptionManager};

/// The result of [`Client::read_value`]: the decoded value alongside the
/// symbol and data type it was decoded against.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub value: Value,
    pub symbol: SymbolInfo,
    pub data_type: DataType,
}

/// The async ADS client: one long-lived connection to a router, a lazily
/// populated symbol/data-type cache, and a set of live subscriptions.
pub struct Client {
    session: AdsSession,
    cache: Arc<MetaCache>,
    subscriptions: Arc<SubscriptionManager>,
    settings: ClientSettings,
    shutting_down: Arc<AtomicBool>,
}

impl Client {
    /// Builds a client targeting `router_addr`. Spawns its notification
    /// dispatch loop and reconnect-maintenance task immediately; the
    /// transport itself is not dialed until [`Client::connect`].
    pub fn new(settings: ClientSettings, router_addr: SocketAddr) -> Self {
        let events = Arc::new(crate::events::EventHub::new());
        let (notifications_tx, notifications_rx) = mpsc::unbounded_channel();
        let session = AdsSession::new(&settings, router_addr, events, notifications_tx);
        let cache = Arc::new(MetaCache::new(session.clone()));
        let subscriptions = Arc::new(SubscriptionManager::new(
            session.clone(),
            settings.delete_unknown_subscriptions,
        ));
        let client = Self {
            session,
            cache,
            subscriptions,
            settings,
            shutting_down: Arc::new(AtomicBool::new(false)),
        };
        client.spawn_notification_dispatch(notifications_rx);
        client.spawn_connection_maintenance();
        client
    }

    /// Dials the router and completes the handshake.
    pub async fn connect(&self) -> Result<()> {
        self.shutting_down.store(false, Ordering::SeqCst);
        self.session.connect().await?;
        Ok(())
    }

    /// Tears down the transport. Marks the disconnect as deliberate, so the
    /// connection-maintenance task does not treat it as a drop to recover from.
    pub async fn disconnect(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.subscriptions.unsubscribe_all().await;
        self.session.disconnect().await;
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Subscribes to the client's lifecycle/diagnostic event stream.
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.session.events().subscribe()
    }

    /// Reads `path`'s current value, resolving its symbol and data type
    /// through the cache on first use.
    pub async fn read_value(&self, path: &str) -> Result<ReadOutcome> {
        let symbol = self.cache.get_symbol(path).await?;
        let data_type = self.cache.resolve(&symbol.type_name).await?;
        let raw = self
            .read_raw(symbol.index_group, symbol.index_offset, symbol.size)
            .await?;
        let mut value = convert::from_raw(&raw, &data_type)?;
        if !self.settings.objectify_enumerations {
            value = strip_enum_names(value);
        }
        Ok(ReadOutcome {
            value,
            symbol,
            data_type,
        })
    }

    /// Writes `value` to `path`, encoding it against the symbol's resolved data type.
    pub async fn write_value(&self, path: &str, value: &Value) -> Result<()> {
        let symbol = self.cache.get_symbol(path).await?;
        let data_type = self.cache.resolve(&symbol.type_name).await?;
        let bytes = convert::to_raw(value, &data_type)?;
        self.write_raw(symbol.index_group, symbol.index_offset, &bytes)
            .await
    }

    /// One-shot `ReadWrite(SymbolValueByName, 0, max_size, path)`, bypassing
    /// the symbol cache entirely.
    pub async fn read_raw_by_path(&self, path: &str, max_size: u32) -> Result<Vec<u8>> {
        self.read_write_by_name(ReservedIndexGroup::SymbolValueByName, 0, max_size, path)
            .await
    }

    /// Creates a server-side variable handle for `path`. Release it with
    /// [`Client::release_variable_handle`] when done.
    pub async fn create_variable_handle(&self, path: &str) -> Result<u32> {
        let data = self
            .read_write_by_name(ReservedIndexGroup::SymbolHandleByName, 0, 4, path)
            .await?;
        if data.len() < 4 {
            return Err(ClientError::UnexpectedResponse);
        }
        Ok(u32::from_le_bytes(data[..4].try_into().unwrap()))
    }

    pub async fn release_variable_handle(&self, handle: u32) -> Result<()> {
        let group: IndexGroup = ReservedIndexGroup::SymbolReleaseHandle.into();
        self.write_raw(group, 0, &handle.to_le_bytes()).await
    }

    /// Reads `length` bytes through a handle created via
    /// [`Client::create_variable_handle`], addressed by
    /// [`ReservedIndexGroup::SymbolValueByHandle`].
    pub async fn read_by_handle(&self, handle: u32, length: u32) -> Result<Vec<u8>> {
        let group: IndexGroup = ReservedIndexGroup::SymbolValueByHandle.into();
        self.read_raw(group, handle, length).await
    }

    pub async fn write_by_handle(&self, handle: u32, data: &[u8]) -> Result<()> {
        let group: IndexGroup = ReservedIndexGroup::SymbolValueByHandle.into();
        self.write_raw(group, handle, data).await
    }

    /// Reads `length` bytes at a raw index group/offset, bypassing the cache.
    pub async fn read_raw(&self, index_group: IndexGroup, index_offset: IndexOffset, length: u32) -> Result<Vec<u8>> {
        let request = AdsReadRequest::new(index_group, index_offset, length);
        let frame = self
            .session
            .send_command(AdsCommand::AdsRead, request.to_bytes().to_vec())
            .await?;
        unpack_read(&frame.body)
    }

    /// Writes raw bytes at a raw index group/offset, bypassing the cache.
    pub async fn write_raw(&self, index_group: IndexGroup, index_offset: IndexOffset, data: &[u8]) -> Result<()> {
        let request = AdsWriteRequest::new(index_group, index_offset, data.len() as u32);
        let mut body = request.to_bytes().to_vec();
        body.extend_from_slice(data);
        let frame = self
            .session
            .send_command(AdsCommand::AdsWrite, body)
            .await?;
        if frame.body.len() < AdsWriteResponse::LENGTH {
            return Err(ClientError::UnexpectedResponse);
        }
        let response =
            AdsWriteResponse::from_bytes(frame.body[..AdsWriteResponse::LENGTH].try_into().unwrap());
        if response.result() != AdsReturnCode::Ok {
            return Err(ClientError::Ads {
                code: response.result(),
            });
        }
        Ok(())
    }

    /// Changes the target's ADS/device state, per `AdsWriteControl`.
    pub async fn write_control(&self, ads_state: AdsState, device_state: u16, data: &[u8]) -> Result<()> {
        let request = AdsWriteControlRequest::new(ads_state, device_state, data.len() as u32);
        let mut body = request.to_bytes().to_vec();
        body.extend_from_slice(data);
        let frame = self
            .session
            .send_command(AdsCommand::AdsWriteControl, body)
            .await?;
        if frame.body.len() < AdsWriteControlResponse::LENGTH {
            return Err(ClientError::UnexpectedResponse);
        }
        let response = AdsWriteControlResponse::from_bytes(
            frame.body[..AdsWriteControlResponse::LENGTH].try_into().unwrap(),
        );
        if response.result() != AdsReturnCode::Ok {
            return Err(ClientError::Ads {
                code: response.result(),
            });
        }
        Ok(())
    }

    /// Reads the target's current ADS state and device state.
    pub async fn read_state(&self) -> Result<(AdsState, u16)> {
        let frame = self
            .session
            .send_command(AdsCommand::AdsReadState, Vec::new())
            .await?;
        if frame.body.len() < AdsReadStateResponse::LENGTH {
            return Err(ClientError::UnexpectedResponse);
        }
        let response = AdsReadStateResponse::from_bytes(
            frame.body[..AdsReadStateResponse::LENGTH].try_into().unwrap(),
        );
        if response.result() != AdsReturnCode::Ok {
            return Err(ClientError::Ads {
                code: response.result(),
            });
        }
        Ok((response.ads_state(), response.device_state()))
    }

    /// Reads the PLC's symbol-version counter, which increments every time
    /// the symbol/data-type tables change (e.g. a program download).
    pub async fn read_symbol_version(&self) -> Result<u8> {
        let group: IndexGroup = ReservedIndexGroup::SymbolVersion.into();
        let data = self.read_raw(group, 0, 1).await?;
        data.first().copied().ok_or(ClientError::UnexpectedResponse)
    }

    /// Reads the target device's name and version.
    pub async fn read_device_info(&self) -> Result<(AdsDeviceVersion, AdsString<16>)> {
        let frame = self
            .session
            .send_command(AdsCommand::AdsReadDeviceInfo, Vec::new())
            .await?;
        if frame.body.len() < AdsDeviceInfoResponse::LENGTH {
            return Err(ClientError::UnexpectedResponse);
        }
        let response = AdsDeviceInfoResponse::from_bytes(
            frame.body[..AdsDeviceInfoResponse::LENGTH].try_into().unwrap(),
        );
        if response.result() != AdsReturnCode::Ok {
            return Err(ClientError::Ads {
                code: response.result(),
            });
        }
        Ok((response.version(), response.device_name().clone()))
    }

    /// Subscribes to change notifications for `path`. `callback` is invoked
    /// from the notification dispatch task for every sample, so it must not
    /// block.
    #[allow(clippy::too_many_arguments)]
    pub async fn subscribe(
        &self,
        path: &str,
        transmission_mode: AdsTransMode,
        max_delay: Duration,
        cycle_time: Duration,
        callback: SampleCallback,
    ) -> Result<SubscriptionHandle> {
        let symbol = self.cache.get_symbol(path).await?;
        self.subscriptions
            .subscribe(
                symbol.index_group,
                symbol.index_offset,
                symbol.size,
                transmission_mode,
                max_delay,
                cycle_time,
                callback,
            )
            .await
    }

    pub async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        self.subscriptions.unsubscribe(handle).await
    }

    async fn read_write_by_name(
        &self,
        group: ReservedIndexGroup,
        index_offset: IndexOffset,
        read_length: u32,
        name: &str,
    ) -> Result<Vec<u8>> {
        let write_data = name.as_bytes().to_vec();
        let request = AdsReadWriteRequest::new(
            group.into(),
            index_offset,
            read_length,
            write_data.len() as u32,
        );
        let mut body = request.to_bytes().to_vec();
        body.extend_from_slice(&write_data);
        let frame = self
            .session
            .send_command(AdsCommand::AdsReadWrite, body)
            .await?;
        unpack_read(&frame.body)
    }

    /// Hands every `AdsDeviceNotification` frame the reader observes to the
    /// subscription manager for dispatch.
    fn spawn_notification_dispatch(
        &self,
        mut notifications: mpsc::UnboundedReceiver<crate::session::AdsFrame>,
    ) {
        let subscriptions = self.subscriptions.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            while let Some(frame) = notifications.recv().await {
                subscriptions
                    .dispatch(frame, session.events(), session.hide_console_warnings())
                    .await;
            }
        });
    }

    /// Reacts to the transport's own lifecycle events: re-arms the reconnect
    /// loop after an unexpected drop, and refreshes the cache/subscriptions
    /// once a reconnect (deliberate or automatic) completes.
    fn spawn_connection_maintenance(&self) {
        let session = self.session.clone();
        let cache = self.cache.clone();
        let subscriptions = self.subscriptions.clone();
        let shutting_down = self.shutting_down.clone();
        let mut events = self.session.events().subscribe();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    ClientEvent::Disconnect => {
                        if !shutting_down.load(Ordering::SeqCst) {
                            session.spawn_auto_reconnect();
                        }
                    }
                    ClientEvent::Reconnect => {
                        cache.invalidate().await;
                        subscriptions
                            .resubscribe_all(session.events(), session.hide_console_warnings())
                            .await;
                    }
                    _ => {}
                }
            }
        });
    }
}

/// Replaces every [`Value::Enum`] in `value` with its bare numeric form,
/// recursing into arrays and structs. Used when `objectify_enumerations`
/// is disabled.
fn strip_enum_names(value: Value) -> Value {
    match value {
        Value::Enum { value, .. } => Value::I64(value),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_enum_names).collect()),
        Value::Struct(fields) => Value::Struct(
            fields
                .into_iter()
                .map(|(name, field)| (name, strip_enum_names(field)))
                .collect(),
        ),
        other => other,
    }
}

/// Strips and validates the 8-byte `AdsRead`/`AdsReadWrite` response header,
/// returning just the data that follows.
fn unpack_read(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() < AdsReadResponse::LENGTH {
        return Err(ClientError::UnexpectedResponse);
    }
    let header_bytes: [u8; AdsReadResponse::LENGTH] = body[..AdsReadResponse::LENGTH].try_into().unwrap();
    let response = AdsReadResponse::from_bytes(header_bytes);
    if response.result() != AdsReturnCode::Ok {
        return Err(ClientError::Ads {
            code: response.result(),
        });
    }
    let end = AdsReadResponse::LENGTH + response.length() as usize;
    if body.len() < end {
        return Err(ClientError::UnexpectedResponse);
    }
    Ok(body[AdsReadResponse::LENGTH..end].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tcads_core::ads::{AdsHeader, AdsTransMode, StateFlag};
    use tcads_core::ams::{AmsCommand, AmsNetId};
    use tcads_core::command::{AdsAddDeviceNotificationResponse};
    use tcads_core::ads::NotificationHandle;
    use tcads_core::io::frame::AmsFrame;
    use tcads_core::io::tokio::AmsStream;
    use tokio::net::TcpListener;

    fn test_settings() -> ClientSettings {
        let mut settings = ClientSettings::new(AmsNetId::new(127, 0, 0, 1, 1, 1), 851);
        settings.auto_reconnect = false;
        settings
    }

    fn minimal_symbol_record(name: &str, type_name: &str, size: u32, ads_data_type: u32) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        body.extend_from_slice(type_name.as_bytes());
        body.push(0);
        body.push(0);

        let entry_length = 32 + body.len();
        let mut record = Vec::with_capacity(entry_length);
        record.extend_from_slice(&(entry_length as u32).to_le_bytes());
        record.extend_from_slice(&0x4020u32.to_le_bytes());
        record.extend_from_slice(&0u32.to_le_bytes());
        record.extend_from_slice(&size.to_le_bytes());
        record.extend_from_slice(&ads_data_type.to_le_bytes());
        record.extend_from_slice(&0u32.to_le_bytes());
        record.extend_from_slice(&0u16.to_le_bytes());
        record.extend_from_slice(&(name.len() as u16).to_le_bytes());
        record.extend_from_slice(&(type_name.len() as u16).to_le_bytes());
        record.extend_from_slice(&0u16.to_le_bytes());
        record.extend_from_slice(&body);
        record
    }

    /// A fake router that completes the handshake, answers any
    /// `SymbolInfoByNameEx` lookup with a fixed WORD symbol, and answers
    /// every `AdsRead`/`AdsWrite` with a canned OK response.
    async fn spawn_fake_router() -> SocketAddr {
        let record = minimal_symbol_record("MAIN.nValue", "WORD", 2, 2);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut stream = AmsStream::new(&mut socket);

            let _ = stream.read_frame().await.unwrap();
            let mut connect_response = Vec::new();
            connect_response.extend_from_slice(&AmsNetId::new(127, 0, 0, 1, 1, 1).to_bytes());
            connect_response.extend_from_slice(&30000u16.to_le_bytes());
            stream
                .write_frame(&AmsFrame::new(AmsCommand::PortConnect, connect_response))
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

                let response_body = match header.command_id() {
                    AdsCommand::AdsReadWrite => {
                        let mut b = AdsReadResponse::new(AdsReturnCode::Ok, record.len() as u32)
                            .to_bytes()
                            .to_vec();
                        b.extend_from_slice(&record);
                        b
                    }
                    AdsCommand::AdsRead => {
                        let payload = 65535u16.to_le_bytes();
                        let mut b = AdsReadResponse::new(AdsReturnCode::Ok, payload.len() as u32)
                            .to_bytes()
                            .to_vec();
                        b.extend_from_slice(&payload);
                        b
                    }
                    AdsCommand::AdsWrite => AdsWriteResponse::new(AdsReturnCode::Ok).to_bytes().to_vec(),
                    _ => AdsReturnCode::Ok.to_bytes().to_vec(),
                };

                let response_header = AdsHeader::new(
                    *header.source(),
                    *header.target(),
                    header.command_id(),
                    StateFlag::tcp_ads_response(),
                    response_body.len() as u32,
                    AdsReturnCode::Ok,
                    header.invoke_id(),
                );
                let mut response_payload = response_header.to_bytes().to_vec();
                response_payload.extend_from_slice(&response_body);
                stream
                    .write_frame(&AmsFrame::new(AmsCommand::AdsCommand, response_payload))
                    .await
                    .unwrap();
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_read_value_resolves_symbol_and_decodes() {
        let addr = spawn_fake_router().await;
        let client = Client::new(test_settings(), addr);
        client.connect().await.unwrap();

        let outcome = client.read_value("MAIN.nValue").await.unwrap();
        assert_eq!(outcome.value, Value::U16(65535));
        assert_eq!(outcome.symbol.name, "MAIN.nValue");
        assert_eq!(outcome.data_type.type_name, "WORD");
    }

    #[tokio::test]
    async fn test_write_value_encodes_and_sends() {
        let addr = spawn_fake_router().await;
        let client = Client::new(test_settings(), addr);
        client.connect().await.unwrap();

        client
            .write_value("MAIN.nValue", &Value::U16(1234))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_marks_deliberate_and_skips_reconnect() {
        let addr = spawn_fake_router().await;
        let client = Client::new(test_settings(), addr);
        client.connect().await.unwrap();
        client.disconnect().await;
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_subscribe_and_dispatch_invokes_callback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut stream = AmsStream::new(&mut socket);
            let _ = stream.read_frame().await.unwrap();
            let mut connect_response = Vec::new();
            connect_response.extend_from_slice(&AmsNetId::new(127, 0, 0, 1, 1, 1).to_bytes());
            connect_response.extend_from_slice(&30000u16.to_le_bytes());
            stream
                .write_frame(&AmsFrame::new(AmsCommand::PortConnect, connect_response))
                .await
                .unwrap();

            let record = minimal_symbol_record("MAIN.nValue", "WORD", 2, 2);
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
                let response_body = match header.command_id() {
                    AdsCommand::AdsReadWrite => {
                        let mut b = AdsReadResponse::new(AdsReturnCode::Ok, record.len() as u32)
                            .to_bytes()
                            .to_vec();
                        b.extend_from_slice(&record);
                        b
                    }
                    AdsCommand::AdsAddDeviceNotification => {
                        AdsAddDeviceNotificationResponse::new(AdsReturnCode::Ok, NotificationHandle::new(7))
                            .to_bytes()
                            .to_vec()
                    }
                    _ => AdsReturnCode::Ok.to_bytes().to_vec(),
                };
                let response_header = AdsHeader::new(
                    *header.source(),
                    *header.target(),
                    header.command_id(),
                    StateFlag::tcp_ads_response(),
                    response_body.len() as u32,
                    AdsReturnCode::Ok,
                    header.invoke_id(),
                );
                let mut response_payload = response_header.to_bytes().to_vec();
                response_payload.extend_from_slice(&response_body);
                stream
                    .write_frame(&AmsFrame::new(AmsCommand::AdsCommand, response_payload))
                    .await
                    .unwrap();
            }
        });

        let client = Client::new(test_settings(), addr);
        client.connect().await.unwrap();

        let received = Arc::new(AtomicUsize::new(0));
        let received_clone = received.clone();
        client
            .subscribe(
                "MAIN.nValue",
                AdsTransMode::ClientOnChange,
                Duration::from_millis(0),
                Duration::from_millis(100),
                Arc::new(move |sample| {
                    received_clone.fetch_add(sample.data.len(), Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();
    }
}
