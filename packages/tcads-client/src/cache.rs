//! Lazy, case-insensitive symbol and data-type cache populated from the
//! PLC's upload index groups.
//!
//! A lookup by name or type name fetches and caches just that one record;
//! [`MetaCache::get_symbols`]/[`MetaCache::get_data_types`] bulk-populate
//! from the `SymbolUpload`/`DataTypeUpload` tables the first time either is
//! called. [`MetaCache::invalidate`] drops everything, which the client
//! calls after a symbol-version change or a reconnect.

use std::collections::{HashMap, HashSet};

use tcads_core::ads::{AdsCommand, AdsReturnCode, DataType, ReservedIndexGroup, SymbolInfo};
use tcads_core::command::{AdsReadRequest, AdsReadResponse, AdsReadWriteRequest, AdsReadWriteResponse};
use tokio::sync::Mutex;

use crate::errors::{ClientError, Result};
use crate::session::AdsSession;

/// Read-length cap passed on upload/by-name reads; the PLC reports the
/// actual data size in the response header regardless of how much headroom
/// this leaves unused.
const UPLOAD_READ_LIMIT: u32 = 4 * 1024 * 1024;
const BY_NAME_READ_LIMIT: u32 = 8192;

struct Inner {
    symbols: HashMap<String, SymbolInfo>,
    data_types: HashMap<String, DataType>,
    all_symbols_cached: bool,
    all_data_types_cached: bool,
}

pub struct MetaCache {
    session: AdsSession,
    inner: Mutex<Inner>,
}

impl MetaCache {
    pub fn new(session: AdsSession) -> Self {
        Self {
            session,
            inner: Mutex::new(Inner {
                symbols: HashMap::new(),
                data_types: HashMap::new(),
                all_symbols_cached: false,
                all_data_types_cached: false,
            }),
        }
    }

    /// Drops every cached entry.
    pub async fn invalidate(&self) {
        let mut inner = self.inner.lock().await;
        inner.symbols.clear();
        inner.data_types.clear();
        inner.all_symbols_cached = false;
        inner.all_data_types_cached = false;
    }

    /// Looks up a symbol by path, fetching it from the PLC on first miss.
    pub async fn get_symbol(&self, name: &str) -> Result<SymbolInfo> {
        let key = name.to_lowercase();
        if let Some(symbol) = self.inner.lock().await.symbols.get(&key).cloned() {
            return Ok(symbol);
        }
        let symbol = self.fetch_symbol_info(name).await?;
        self.inner.lock().await.symbols.insert(key, symbol.clone());
        Ok(symbol)
    }

    /// Returns every symbol in the PLC's symbol table, uploading it in full on first call.
    pub async fn get_symbols(&self) -> Result<Vec<SymbolInfo>> {
        self.load_all_symbols().await?;
        Ok(self.inner.lock().await.symbols.values().cloned().collect())
    }

    /// Looks up a data type by name, fetching it from the PLC on first miss.
    pub async fn get_data_type(&self, type_name: &str) -> Result<DataType> {
        let key = type_name.to_lowercase();
        if let Some(data_type) = self.inner.lock().await.data_types.get(&key).cloned() {
            return Ok(data_type);
        }
        let data_type = self.fetch_data_type_info(type_name).await?;
        self.inner
            .lock()
            .await
            .data_types
            .insert(key, data_type.clone());
        Ok(data_type)
    }

    /// Returns every data type in the PLC's data-type table, uploading it in full on first call.
    pub async fn get_data_types(&self) -> Result<Vec<DataType>> {
        self.load_all_data_types().await?;
        Ok(self.inner.lock().await.data_types.values().cloned().collect())
    }

    /// Follows `typeName` alias chains until reaching a struct, array, enum,
    /// or a name the cache has no further data type for (a scalar primitive).
    /// The originally requested name stays the caller's observable label;
    /// this only walks far enough to reach the concrete shape.
    pub async fn resolve(&self, type_name: &str) -> Result<DataType> {
        let mut current = self.get_data_type(type_name).await?;
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(current.cache_key());
        while current.sub_items.is_empty()
            && current.enum_info.is_empty()
            && current.array_info.is_empty()
            && !current.type_name.is_empty()
            && !current.type_name.eq_ignore_ascii_case(&current.name)
        {
            let next_name = current.type_name.clone();
            if !seen.insert(next_name.to_lowercase()) {
                break; // cyclical alias chain
            }
            match self.get_data_type(&next_name).await {
                Ok(next) => current = next,
                Err(_) => break, // typeName names a scalar primitive, not a table entry
            }
        }
        Ok(current)
    }

    async fn fetch_symbol_info(&self, name: &str) -> Result<SymbolInfo> {
        let data = self
            .read_write_by_name(ReservedIndexGroup::SymbolInfoByNameEx, name)
            .await
            .map_err(|err| match err {
                ClientError::Ads { code } => ClientError::from_return_code(code, Some(name))
                    .unwrap_or(ClientError::Ads { code }),
                other => other,
            })?;
        Ok(SymbolInfo::try_from(data.as_slice())?)
    }

    async fn fetch_data_type_info(&self, type_name: &str) -> Result<DataType> {
        let data = self
            .read_write_by_name(ReservedIndexGroup::DataTypeInfoByNameEx, type_name)
            .await?;
        Ok(DataType::try_from(data.as_slice())?)
    }

    /// `AdsReadWrite` against `group`, writing `name` as the lookup key and
    /// reading back the matching record.
    async fn read_write_by_name(&self, group: ReservedIndexGroup, name: &str) -> Result<Vec<u8>> {
        let write_data = name.as_bytes().to_vec();
        let request = AdsReadWriteRequest::new(
            group.into(),
            0,
            BY_NAME_READ_LIMIT,
            write_data.len() as u32,
        );
        let mut body = request.to_bytes().to_vec();
        body.extend_from_slice(&write_data);

        let frame = self
            .session
            .send_command(AdsCommand::AdsReadWrite, body)
            .await?;
        self.unpack_read_response(&frame.body)
    }

    async fn load_all_symbols(&self) -> Result<()> {
        if self.inner.lock().await.all_symbols_cached {
            return Ok(());
        }
        let data = self.upload(ReservedIndexGroup::SymbolUpload).await?;
        let symbols = SymbolInfo::parse_all(&data)?;
        let mut inner = self.inner.lock().await;
        for symbol in symbols {
            inner.symbols.insert(symbol.cache_key(), symbol);
        }
        inner.all_symbols_cached = true;
        Ok(())
    }

    async fn load_all_data_types(&self) -> Result<()> {
        if self.inner.lock().await.all_data_types_cached {
            return Ok(());
        }
        let data = self.upload(ReservedIndexGroup::DataTypeUpload).await?;
        let data_types = DataType::parse_all(&data)?;
        let mut inner = self.inner.lock().await;
        for data_type in data_types {
            inner.data_types.insert(data_type.cache_key(), data_type);
        }
        inner.all_data_types_cached = true;
        Ok(())
    }

    async fn upload(&self, group: ReservedIndexGroup) -> Result<Vec<u8>> {
        let request = AdsReadRequest::new(group.into(), 0, UPLOAD_READ_LIMIT);
        let frame = self
            .session
            .send_command(AdsCommand::AdsRead, request.to_bytes().to_vec())
            .await?;
        self.unpack_read_response(&frame.body)
    }

    /// Strips and validates the 8-byte `AdsRead`/`AdsReadWrite` response
    /// header shared by both commands, returning just the data that follows.
    fn unpack_read_response(&self, body: &[u8]) -> Result<Vec<u8>> {
        if body.len() < AdsReadResponse::LENGTH {
            return Err(ClientError::UnexpectedResponse);
        }
        let header_bytes: [u8; AdsReadResponse::LENGTH] =
            body[..AdsReadResponse::LENGTH].try_into().unwrap();
        let response = AdsReadWriteResponse::from_bytes(header_bytes);
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventHub;
    use crate::settings::ClientSettings;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tcads_core::ads::{AdsHeader, AdsReturnCode, StateFlag};
    use tcads_core::ams::{AmsCommand, AmsNetId};
    use tcads_core::io::frame::AmsFrame;
    use tcads_core::io::tokio::AmsStream;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    fn make_cache(router_addr: SocketAddr) -> MetaCache {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = AdsSession::new(
            &ClientSettings::new(AmsNetId::new(127, 0, 0, 1, 1, 1), 851),
            router_addr,
            Arc::new(EventHub::new()),
            tx,
        );
        MetaCache::new(session)
    }

    fn minimal_symbol_record(name: &str, type_name: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        body.extend_from_slice(type_name.as_bytes());
        body.push(0);
        body.push(0); // empty comment + NUL

        let entry_length = 32 + body.len();
        let mut record = Vec::with_capacity(entry_length);
        record.extend_from_slice(&(entry_length as u32).to_le_bytes());
        record.extend_from_slice(&0xF020u32.to_le_bytes()); // indexGroup
        record.extend_from_slice(&0u32.to_le_bytes()); // indexOffset
        record.extend_from_slice(&2u32.to_le_bytes()); // size
        record.extend_from_slice(&2u32.to_le_bytes()); // adsDataType (INT)
        record.extend_from_slice(&0u32.to_le_bytes()); // flags
        record.extend_from_slice(&0u16.to_le_bytes()); // arrayDim
        record.extend_from_slice(&(name.len() as u16).to_le_bytes());
        record.extend_from_slice(&(type_name.len() as u16).to_le_bytes());
        record.extend_from_slice(&0u16.to_le_bytes()); // commentLength
        record.extend_from_slice(&body);
        record
    }

    /// A fake router that completes the Port Connect handshake, then answers
    /// any `AdsReadWrite` against `SymbolInfoByNameEx` with one fixed symbol
    /// record, ignoring the name actually written.
    async fn spawn_fake_router(record: Vec<u8>) -> SocketAddr {
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

                let mut response_body = AdsReadResponse::new(AdsReturnCode::Ok, record.len() as u32)
                    .to_bytes()
                    .to_vec();
                response_body.extend_from_slice(&record);

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
    async fn test_get_symbol_fetches_and_caches() {
        let record = minimal_symbol_record("MAIN.nCount", "INT");
        let addr = spawn_fake_router(record).await;
        let cache = make_cache(addr);
        cache.session.connect().await.unwrap();

        let symbol = cache.get_symbol("MAIN.nCount").await.unwrap();
        assert_eq!(symbol.type_name, "INT");
        assert!(cache.inner.lock().await.symbols.contains_key("main.ncount"));
    }

    #[tokio::test]
    async fn test_get_symbols_bulk_loads_once() {
        let mut records = minimal_symbol_record("MAIN.a", "INT");
        records.extend_from_slice(&minimal_symbol_record("MAIN.b", "BOOL"));
        let addr = spawn_fake_router(records).await;
        let cache = make_cache(addr);
        cache.session.connect().await.unwrap();

        let symbols = cache.get_symbols().await.unwrap();
        assert_eq!(symbols.len(), 2);
        assert!(cache.inner.lock().await.all_symbols_cached);
    }

    #[tokio::test]
    async fn test_invalidate_clears_cache() {
        let record = minimal_symbol_record("MAIN.nCount", "INT");
        let addr = spawn_fake_router(record).await;
        let cache = make_cache(addr);
        cache.session.connect().await.unwrap();

        cache.get_symbol("MAIN.nCount").await.unwrap();
        cache.invalidate().await;
        let inner = cache.inner.lock().await;
        assert!(inner.symbols.is_empty());
        assert!(!inner.all_symbols_cached);
    }
}
