//! Batches N homogeneous sub-operations into one `AdsReadWrite` round-trip
//! against a reserved sum-command index group.
//!
//! The outer ADS call either succeeds or fails as a whole (a malformed
//! request, an unreachable target); each sub-operation inside a successful
//! call carries its own ADS return code, so one missing symbol in a batch of
//! a hundred doesn't fail the other ninety-nine.

use tcads_core::ads::{AdsCommand, AdsReturnCode, IndexGroup, IndexOffset, ReservedIndexGroup};
use tcads_core::command::{AdsReadResponse, AdsReadWriteRequest};

use crate::errors::{ClientError, Result};
use crate::session::AdsSession;

/// One `AdsRead`-shaped sub-operation for [`sum_read`].
#[derive(Debug, Clone, Copy)]
pub struct SumReadItem {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub length: u32,
}

/// One `AdsWrite`-shaped sub-operation for [`sum_write`].
#[derive(Debug, Clone)]
pub struct SumWriteItem {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub data: Vec<u8>,
}

/// One `AdsReadWrite`-shaped sub-operation for [`sum_read_write`].
#[derive(Debug, Clone)]
pub struct SumReadWriteItem {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub read_length: u32,
    pub write_data: Vec<u8>,
}

/// The per-sub-operation outcome: the ADS return code the PLC reported for
/// just this slot, plus whatever data it carries back.
#[derive(Debug, Clone)]
pub struct SumOutcome<T> {
    pub result: AdsReturnCode,
    pub value: T,
}

/// Batched read: `N` × (group, offset, length) in, `N` × (error, data) out.
/// Against [`ReservedIndexGroup::SumCommandRead`].
pub async fn sum_read(session: &AdsSession, items: &[SumReadItem]) -> Result<Vec<SumOutcome<Vec<u8>>>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let n = items.len();
    let mut write_data = Vec::with_capacity(n * 12);
    let mut read_length = (n * AdsReturnCode::LENGTH) as u32;
    for item in items {
        write_data.extend_from_slice(&item.index_group.to_le_bytes());
        write_data.extend_from_slice(&item.index_offset.to_le_bytes());
        write_data.extend_from_slice(&item.length.to_le_bytes());
        read_length += item.length;
    }

    let data = send_sum(
        session,
        ReservedIndexGroup::SumCommandRead,
        n as u32,
        read_length,
        write_data,
    )
    .await?;

    let mut cursor = n * AdsReturnCode::LENGTH;
    let mut outcomes = Vec::with_capacity(n);
    for item in items {
        let result = read_return_code(&data, outcomes.len() * AdsReturnCode::LENGTH)?;
        let len = item.length as usize;
        let value = data
            .get(cursor..cursor + len)
            .ok_or(ClientError::UnexpectedResponse)?
            .to_vec();
        cursor += len;
        outcomes.push(SumOutcome { result, value });
    }
    Ok(outcomes)
}

/// Batched write: `N` × (group, offset, length, data) in, `N` × error out.
/// Against [`ReservedIndexGroup::SumCommandWrite`].
pub async fn sum_write(session: &AdsSession, items: &[SumWriteItem]) -> Result<Vec<AdsReturnCode>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let n = items.len();
    let mut headers = Vec::with_capacity(n * 12);
    let mut payloads = Vec::new();
    for item in items {
        headers.extend_from_slice(&item.index_group.to_le_bytes());
        headers.extend_from_slice(&item.index_offset.to_le_bytes());
        headers.extend_from_slice(&(item.data.len() as u32).to_le_bytes());
        payloads.extend_from_slice(&item.data);
    }
    headers.extend_from_slice(&payloads);
    let read_length = (n * AdsReturnCode::LENGTH) as u32;

    let data = send_sum(
        session,
        ReservedIndexGroup::SumCommandWrite,
        n as u32,
        read_length,
        headers,
    )
    .await?;

    (0..n)
        .map(|i| read_return_code(&data, i * AdsReturnCode::LENGTH))
        .collect()
}

/// Batched read-write: `N` × (group, offset, readLength, writeLength, data)
/// in, `N` × (error, length, data) out. Against
/// [`ReservedIndexGroup::SumCommandReadWrite`].
pub async fn sum_read_write(
    session: &AdsSession,
    items: &[SumReadWriteItem],
) -> Result<Vec<SumOutcome<Vec<u8>>>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let n = items.len();
    let mut headers = Vec::with_capacity(n * 16);
    let mut payloads = Vec::new();
    let mut read_length = (n * 8) as u32; // N x (error(4) + length(4))
    for item in items {
        headers.extend_from_slice(&item.index_group.to_le_bytes());
        headers.extend_from_slice(&item.index_offset.to_le_bytes());
        headers.extend_from_slice(&item.read_length.to_le_bytes());
        headers.extend_from_slice(&(item.write_data.len() as u32).to_le_bytes());
        payloads.extend_from_slice(&item.write_data);
        read_length += item.read_length;
    }
    headers.extend_from_slice(&payloads);

    let data = send_sum(
        session,
        ReservedIndexGroup::SumCommandReadWrite,
        n as u32,
        read_length,
        headers,
    )
    .await?;

    let mut cursor = n * 8;
    let mut outcomes = Vec::with_capacity(n);
    for i in 0..n {
        let offset = i * 8;
        let result = read_return_code(&data, offset)?;
        let declared_len = data
            .get(offset + 4..offset + 8)
            .map(|b| u32::from_le_bytes(b.try_into().unwrap()))
            .ok_or(ClientError::UnexpectedResponse)? as usize;
        let value = data
            .get(cursor..cursor + declared_len)
            .ok_or(ClientError::UnexpectedResponse)?
            .to_vec();
        cursor += declared_len;
        outcomes.push(SumOutcome { result, value });
    }
    Ok(outcomes)
}

/// Creates N variable handles in one round-trip (`ADSIGRP_SYM_HNDBYNAME` per
/// sub-operation) against [`ReservedIndexGroup::SumCommandReadEx`]. Each
/// outcome's `value` is the resulting handle, valid only when `result` is
/// [`AdsReturnCode::Ok`].
pub async fn sum_create_handles(session: &AdsSession, paths: &[String]) -> Result<Vec<SumOutcome<u32>>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let n = paths.len();
    let group: IndexGroup = ReservedIndexGroup::SymbolHandleByName.into();
    let mut headers = Vec::with_capacity(n * 16);
    let mut payloads = Vec::new();
    for path in paths {
        let path_bytes = path.as_bytes();
        headers.extend_from_slice(&group.to_le_bytes());
        headers.extend_from_slice(&0u32.to_le_bytes()); // offset
        headers.extend_from_slice(&4u32.to_le_bytes()); // readLength: one u32 handle back
        headers.extend_from_slice(&(path_bytes.len() as u32).to_le_bytes());
        payloads.extend_from_slice(path_bytes);
    }
    headers.extend_from_slice(&payloads);
    let read_length = (n * 8 + n * 4) as u32; // N x (error+length) + N x 4-byte handle

    let data = send_sum(
        session,
        ReservedIndexGroup::SumCommandReadEx,
        n as u32,
        read_length,
        headers,
    )
    .await?;

    let mut cursor = n * 8;
    let mut outcomes = Vec::with_capacity(n);
    for i in 0..n {
        let offset = i * 8;
        let result = read_return_code(&data, offset)?;
        let handle = data
            .get(cursor..cursor + 4)
            .map(|b| u32::from_le_bytes(b.try_into().unwrap()))
            .ok_or(ClientError::UnexpectedResponse)?;
        cursor += 4;
        outcomes.push(SumOutcome { result, value: handle });
    }
    Ok(outcomes)
}

/// Releases N variable handles in one round-trip (`ADSIGRP_SYM_RELEASEHND`
/// per sub-operation) against [`ReservedIndexGroup::SumCommandReadEx2`].
pub async fn sum_delete_handles(session: &AdsSession, handles: &[u32]) -> Result<Vec<AdsReturnCode>> {
    if handles.is_empty() {
        return Ok(Vec::new());
    }
    let n = handles.len();
    let group: IndexGroup = ReservedIndexGroup::SymbolReleaseHandle.into();
    let mut headers = Vec::with_capacity(n * 12);
    let mut payloads = Vec::new();
    for handle in handles {
        headers.extend_from_slice(&group.to_le_bytes());
        headers.extend_from_slice(&0u32.to_le_bytes());
        headers.extend_from_slice(&4u32.to_le_bytes());
        payloads.extend_from_slice(&handle.to_le_bytes());
    }
    headers.extend_from_slice(&payloads);
    let read_length = (n * AdsReturnCode::LENGTH) as u32;

    let data = send_sum(
        session,
        ReservedIndexGroup::SumCommandReadEx2,
        n as u32,
        read_length,
        headers,
    )
    .await?;

    (0..n)
        .map(|i| read_return_code(&data, i * AdsReturnCode::LENGTH))
        .collect()
}

fn read_return_code(data: &[u8], offset: usize) -> Result<AdsReturnCode> {
    let bytes: [u8; AdsReturnCode::LENGTH] = data
        .get(offset..offset + AdsReturnCode::LENGTH)
        .ok_or(ClientError::UnexpectedResponse)?
        .try_into()
        .unwrap();
    Ok(AdsReturnCode::from_bytes(bytes))
}

/// Issues the outer `AdsReadWrite`, validates the outer ADS result, and
/// returns the inner sum-command payload (past the outer 8-byte header).
async fn send_sum(
    session: &AdsSession,
    group: ReservedIndexGroup,
    count: u32,
    read_length: u32,
    write_data: Vec<u8>,
) -> Result<Vec<u8>> {
    let request = AdsReadWriteRequest::new(group.into(), count, read_length, write_data.len() as u32);
    let mut body = request.to_bytes().to_vec();
    body.extend_from_slice(&write_data);

    let frame = session.send_command(AdsCommand::AdsReadWrite, body).await?;
    let outer = &frame.body;
    if outer.len() < AdsReadResponse::LENGTH {
        return Err(ClientError::UnexpectedResponse);
    }
    let header_bytes: [u8; AdsReadResponse::LENGTH] = outer[..AdsReadResponse::LENGTH].try_into().unwrap();
    let response = AdsReadResponse::from_bytes(header_bytes);
    if response.result() != AdsReturnCode::Ok {
        return Err(ClientError::Ads {
            code: response.result(),
        });
    }
    let end = AdsReadResponse::LENGTH + response.length() as usize;
    outer
        .get(AdsReadResponse::LENGTH..end)
        .map(|s| s.to_vec())
        .ok_or(ClientError::UnexpectedResponse)
}
