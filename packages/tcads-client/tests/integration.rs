//! End-to-end scenarios against a fake AMS router, driving the public
//! [`Client`] facade exactly as a caller would: resolve a symbol, read or
//! write its value, or subscribe to it and wait for a sample.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tcads_client::{Client, ClientSettings, Value};
use tcads_core::ads::{
    AdsCommand, AdsHeader, AdsReturnCode, AdsTransMode, NotificationHandle, StateFlag,
    WindowsFileTime,
};
use tcads_core::ams::{AmsCommand, AmsNetId};
use tcads_core::command::{
    AdsAddDeviceNotificationResponse, AdsDeviceNotificationStreamHeader,
    AdsNotificationSampleHeader, AdsReadResponse, AdsStampHeader, AdsWriteResponse,
};
use tcads_core::io::frame::AmsFrame;
use tcads_core::io::tokio::AmsStream;
use tokio::net::TcpListener;
use tokio::sync::Mutex as AsyncMutex;

fn test_settings() -> ClientSettings {
    let mut settings = ClientSettings::new(AmsNetId::new(127, 0, 0, 1, 1, 1), 851);
    settings.auto_reconnect = false;
    settings
}

/// Builds the variable-length record `SymbolInfoByNameEx` returns for one
/// symbol: fixed 32-byte header, then `name\0type_name\0\0`.
fn symbol_record(name: &str, type_name: &str, index_group: u32, index_offset: u32, size: u32) -> Vec<u8> {
    let mut tail = Vec::new();
    tail.extend_from_slice(name.as_bytes());
    tail.push(0);
    tail.extend_from_slice(type_name.as_bytes());
    tail.push(0);
    tail.push(0);

    let entry_length = 32 + tail.len();
    let mut record = Vec::with_capacity(entry_length);
    record.extend_from_slice(&(entry_length as u32).to_le_bytes());
    record.extend_from_slice(&index_group.to_le_bytes());
    record.extend_from_slice(&index_offset.to_le_bytes());
    record.extend_from_slice(&size.to_le_bytes());
    record.extend_from_slice(&0u32.to_le_bytes()); // ads data type, unused by the fixture
    record.extend_from_slice(&0u32.to_le_bytes());
    record.extend_from_slice(&0u16.to_le_bytes());
    record.extend_from_slice(&(name.len() as u16).to_le_bytes());
    record.extend_from_slice(&(type_name.len() as u16).to_le_bytes());
    record.extend_from_slice(&0u16.to_le_bytes());
    record.extend_from_slice(&tail);
    record
}

struct Symbol {
    record: Vec<u8>,
    index_group: u32,
    index_offset: u32,
}

/// A fake router serving a fixed set of named symbols: `SymbolInfoByNameEx`
/// resolves a path to its record, `AdsRead`/`AdsWrite` act against a shared
/// byte store keyed by `(group, offset)`, and `AddDeviceNotification`
/// schedules one delayed unsolicited sample.
async fn spawn_fake_router(symbols: Vec<(&'static str, Symbol, Vec<u8>)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut by_name = HashMap::new();
    let store = Arc::new(AsyncMutex::new(HashMap::new()));
    for (name, symbol, initial) in symbols {
        store.lock().await.insert((symbol.index_group, symbol.index_offset), initial);
        by_name.insert(name.to_string(), symbol);
    }

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
            let req_body = &incoming[32..];

            let mut notify: Option<(NotificationHandle, u32, u32)> = None;
            let response_body = match header.command_id() {
                AdsCommand::AdsReadWrite => {
                    // SymbolInfoByNameEx request: 16-byte header then the path.
                    let path = std::str::from_utf8(&req_body[16..]).unwrap();
                    let record = by_name.get(path).map(|s| s.record.clone()).unwrap_or_default();
                    let mut b = AdsReadResponse::new(AdsReturnCode::Ok, record.len() as u32)
                        .to_bytes()
                        .to_vec();
                    b.extend_from_slice(&record);
                    b
                }
                AdsCommand::AdsRead => {
                    let group = u32::from_le_bytes(req_body[0..4].try_into().unwrap());
                    let offset = u32::from_le_bytes(req_body[4..8].try_into().unwrap());
                    let stored = store.lock().await.get(&(group, offset)).cloned().unwrap_or_default();
                    let mut b = AdsReadResponse::new(AdsReturnCode::Ok, stored.len() as u32)
                        .to_bytes()
                        .to_vec();
                    b.extend_from_slice(&stored);
                    b
                }
                AdsCommand::AdsWrite => {
                    let group = u32::from_le_bytes(req_body[0..4].try_into().unwrap());
                    let offset = u32::from_le_bytes(req_body[4..8].try_into().unwrap());
                    let length = u32::from_le_bytes(req_body[8..12].try_into().unwrap()) as usize;
                    let data = req_body[12..12 + length].to_vec();
                    store.lock().await.insert((group, offset), data);
                    AdsWriteResponse::new(AdsReturnCode::Ok).to_bytes().to_vec()
                }
                AdsCommand::AdsAddDeviceNotification => {
                    let handle = NotificationHandle::new(0xBEEF);
                    let group = u32::from_le_bytes(req_body[0..4].try_into().unwrap());
                    let offset = u32::from_le_bytes(req_body[4..8].try_into().unwrap());
                    notify = Some((handle, group, offset));
                    AdsAddDeviceNotificationResponse::new(AdsReturnCode::Ok, handle)
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

            if let Some((handle, group, offset)) = notify {
                tokio::time::sleep(Duration::from_millis(2000)).await;
                let data = store.lock().await.get(&(group, offset)).cloned().unwrap_or_default();
                let sample = {
                    let sample_header =
                        AdsNotificationSampleHeader::new(handle, data.len() as u32);
                    let mut s = sample_header.to_bytes().to_vec();
                    s.extend_from_slice(&data);
                    s
                };
                let stamp = AdsStampHeader::new(WindowsFileTime::now(), 1);
                let mut stamps = stamp.to_bytes().to_vec();
                stamps.extend_from_slice(&sample);
                let stream_header = AdsDeviceNotificationStreamHeader::new(stamps.len() as u32, 1);
                let mut body = stream_header.to_bytes().to_vec();
                body.extend_from_slice(&stamps);

                let notify_header = AdsHeader::new(
                    *header.source(),
                    *header.target(),
                    AdsCommand::AdsDeviceNotification,
                    StateFlag::tcp_ads_request(),
                    body.len() as u32,
                    AdsReturnCode::Ok,
                    0,
                );
                let mut notify_payload = notify_header.to_bytes().to_vec();
                notify_payload.extend_from_slice(&body);
                stream
                    .write_frame(&AmsFrame::new(AmsCommand::AdsCommand, notify_payload))
                    .await
                    .unwrap();
            }
        }
    });
    addr
}

/// S1 — scalar read. Read a `WORD` symbol; expect the decoded value, its
/// type name, and its size to all match the resolved symbol/data type.
#[tokio::test]
async fn s1_scalar_read() {
    let addr = spawn_fake_router(vec![(
        "MAIN.wValue",
        Symbol {
            record: symbol_record("MAIN.wValue", "WORD", 0x4020, 0, 2),
            index_group: 0x4020,
            index_offset: 0,
        },
        65535u16.to_le_bytes().to_vec(),
    )])
    .await;

    let client = Client::new(test_settings(), addr);
    client.connect().await.unwrap();

    let outcome = client.read_value("MAIN.wValue").await.unwrap();
    assert_eq!(outcome.value, Value::U16(65535));
    assert_eq!(outcome.data_type.type_name, "WORD");
    assert_eq!(outcome.symbol.size, 2);
}

/// S2 — scalar write-back. Write a value to an `INT` symbol, read it back,
/// and expect the exact value round-trips, including a negative one.
#[tokio::test]
async fn s2_scalar_write_back() {
    let addr = spawn_fake_router(vec![(
        "MAIN.nValue",
        Symbol {
            record: symbol_record("MAIN.nValue", "INT", 0x4020, 0, 2),
            index_group: 0x4020,
            index_offset: 0,
        },
        0i16.to_le_bytes().to_vec(),
    )])
    .await;

    let client = Client::new(test_settings(), addr);
    client.connect().await.unwrap();

    client
        .write_value("MAIN.nValue", &Value::I16(32767))
        .await
        .unwrap();
    let outcome = client.read_value("MAIN.nValue").await.unwrap();
    assert_eq!(outcome.value, Value::I16(32767));

    client
        .write_value("MAIN.nValue", &Value::I16(-32768))
        .await
        .unwrap();
    let outcome = client.read_value("MAIN.nValue").await.unwrap();
    assert_eq!(outcome.value, Value::I16(-32768));
}

/// S6 — subscription with a 2000 ms delay on a constant value. Expect the
/// first callback to land no earlier than 2000 ms and no later than 2300 ms,
/// carrying the subscribed value.
#[tokio::test]
async fn s6_subscription_timing() {
    let addr = spawn_fake_router(vec![(
        "MAIN.nCount",
        Symbol {
            record: symbol_record("MAIN.nCount", "DINT", 0x4020, 0, 4),
            index_group: 0x4020,
            index_offset: 0,
        },
        12245i32.to_le_bytes().to_vec(),
    )])
    .await;

    let client = Client::new(test_settings(), addr);
    client.connect().await.unwrap();

    let received: Arc<AsyncMutex<Option<(i32, Duration)>>> = Arc::new(AsyncMutex::new(None));
    let received_clone = received.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    let start = Instant::now();
    client
        .subscribe(
            "MAIN.nCount",
            AdsTransMode::ServerCycle,
            Duration::from_millis(2000),
            Duration::from_millis(100),
            Arc::new(move |sample| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                let value = i32::from_le_bytes(sample.data[..4].try_into().unwrap());
                let elapsed = start.elapsed();
                let received_clone = received_clone.clone();
                tokio::spawn(async move {
                    *received_clone.lock().await = Some((value, elapsed));
                });
            }),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let (value, elapsed) = received.lock().await.expect("callback should have fired");
    assert_eq!(value, 12245);
    assert!(elapsed >= Duration::from_millis(2000));
    assert!(elapsed <= Duration::from_millis(2300));
}
