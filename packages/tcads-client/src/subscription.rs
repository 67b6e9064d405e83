//! Maps local subscription objects to server-assigned notification handles,
//! dispatches incoming `AdsDeviceNotification` samples, and reissues every
//! live subscription after a reconnect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tcads_core::ads::{
    AdsCommand, AdsReturnCode, AdsTransMode, IndexGroup, IndexOffset, NotificationHandle,
};
use tcads_core::command::{
    AdsAddDeviceNotificationRequest, AdsAddDeviceNotificationResponse,
    AdsDeleteDeviceNotificationRequest, AdsDeviceNotificationStreamHeader, AdsNotificationSampleHeader,
    AdsStampHeader,
};
use tokio::sync::Mutex;

use crate::errors::{ClientError, Result};
use crate::events::EventHub;
use crate::session::{AdsFrame, AdsSession};

/// Opaque reference to a live subscription, returned by
/// [`SubscriptionManager::subscribe`] and used to cancel it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// One sample pushed by the PLC: when it was stamped and the raw bytes, shaped
/// by whatever data type the subscription was created against.
#[derive(Debug, Clone)]
pub struct NotificationSample {
    pub timestamp: DateTime<Utc>,
    pub data: Vec<u8>,
}

pub type SampleCallback = Arc<dyn Fn(NotificationSample) + Send + Sync>;

/// The request parameters behind one local subscription: reissued verbatim
/// against a freshly-assigned handle after every reconnect.
#[derive(Clone)]
pub struct Subscription {
    pub handle: SubscriptionHandle,
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub length: u32,
    pub transmission_mode: AdsTransMode,
    pub max_delay: Duration,
    pub cycle_time: Duration,
}

struct Entry {
    subscription: Subscription,
    callback: SampleCallback,
    server_handle: Option<NotificationHandle>,
}

struct Inner {
    next_id: AtomicU64,
    entries: HashMap<SubscriptionHandle, Entry>,
    by_server_handle: HashMap<NotificationHandle, SubscriptionHandle>,
}

/// Owns every live subscription for one [`AdsSession`](crate::session::AdsSession).
pub struct SubscriptionManager {
    session: AdsSession,
    delete_unknown_subscriptions: bool,
    inner: Mutex<Inner>,
}

impl SubscriptionManager {
    pub fn new(session: AdsSession, delete_unknown_subscriptions: bool) -> Self {
        Self {
            session,
            delete_unknown_subscriptions,
            inner: Mutex::new(Inner {
                next_id: AtomicU64::new(1),
                entries: HashMap::new(),
                by_server_handle: HashMap::new(),
            }),
        }
    }

    /// Registers a new subscription and issues its `AddDeviceNotification`
    /// request immediately.
    #[allow(clippy::too_many_arguments)]
    pub async fn subscribe(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        length: u32,
        transmission_mode: AdsTransMode,
        max_delay: Duration,
        cycle_time: Duration,
        callback: SampleCallback,
    ) -> Result<SubscriptionHandle> {
        let local_handle = {
            let inner = self.inner.lock().await;
            SubscriptionHandle(inner.next_id.fetch_add(1, Ordering::Relaxed))
        };
        let subscription = Subscription {
            handle: local_handle,
            index_group,
            index_offset,
            length,
            transmission_mode,
            max_delay,
            cycle_time,
        };

        let server_handle = self.add_device_notification(&subscription).await?;

        let mut inner = self.inner.lock().await;
        inner.by_server_handle.insert(server_handle, local_handle);
        inner.entries.insert(
            local_handle,
            Entry {
                subscription,
                callback,
                server_handle: Some(server_handle),
            },
        );
        Ok(local_handle)
    }

    /// Cancels one subscription, releasing its server-side handle.
    pub async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        let entry = self.inner.lock().await.entries.remove(&handle);
        let Some(entry) = entry else {
            return Ok(());
        };
        if let Some(server_handle) = entry.server_handle {
            self.inner
                .lock()
                .await
                .by_server_handle
                .remove(&server_handle);
            self.delete_device_notification(server_handle).await?;
        }
        Ok(())
    }

    /// Cancels every subscription. Idempotent; best-effort on the server-side
    /// teardown since this typically runs during disconnect/shutdown.
    pub async fn unsubscribe_all(&self) {
        let entries: Vec<Entry> = {
            let mut inner = self.inner.lock().await;
            inner.by_server_handle.clear();
            inner.entries.drain().map(|(_, entry)| entry).collect()
        };
        for entry in entries {
            if let Some(server_handle) = entry.server_handle {
                let _ = self.delete_device_notification(server_handle).await;
            }
        }
    }

    /// Reissues every subscription's `AddDeviceNotification` against the
    /// (now different) connection, after a reconnect. Subscriptions that fail
    /// to re-arm stay registered locally with no server handle, and a
    /// warning is emitted rather than failing the reconnect itself.
    pub async fn resubscribe_all(&self, events: &EventHub, hide_console_warnings: bool) {
        let handles: Vec<SubscriptionHandle> = self.inner.lock().await.entries.keys().copied().collect();
        for handle in handles {
            let subscription = {
                let inner = self.inner.lock().await;
                match inner.entries.get(&handle) {
                    Some(entry) => entry.subscription.clone(),
                    None => continue,
                }
            };
            match self.add_device_notification(&subscription).await {
                Ok(server_handle) => {
                    let mut inner = self.inner.lock().await;
                    if let Some(entry) = inner.entries.get_mut(&handle) {
                        entry.server_handle = Some(server_handle);
                    }
                    inner.by_server_handle.insert(server_handle, handle);
                }
                Err(err) => {
                    events.warn(
                        hide_console_warnings,
                        format!("failed to re-arm subscription after reconnect: {err}"),
                    );
                }
            }
        }
    }

    /// Parses one `AdsDeviceNotification` frame body and fans each sample out
    /// to the subscription it belongs to. Samples for a handle this manager
    /// doesn't recognise are either cleaned up server-side or just warned
    /// about, depending on `delete_unknown_subscriptions`.
    pub async fn dispatch(&self, frame: AdsFrame, events: &EventHub, hide_console_warnings: bool) {
        if let Err(err) = self.dispatch_inner(&frame.body, events, hide_console_warnings).await {
            events.warn(
                hide_console_warnings,
                format!("dropped malformed device notification: {err}"),
            );
        }
    }

    async fn dispatch_inner(
        &self,
        body: &[u8],
        events: &EventHub,
        hide_console_warnings: bool,
    ) -> Result<()> {
        if body.len() < AdsDeviceNotificationStreamHeader::LENGTH {
            return Err(ClientError::UnexpectedResponse);
        }
        let stream_header = AdsDeviceNotificationStreamHeader::from_bytes(
            body[..AdsDeviceNotificationStreamHeader::LENGTH]
                .try_into()
                .unwrap(),
        );
        let mut cursor = AdsDeviceNotificationStreamHeader::LENGTH;

        for _ in 0..stream_header.stamps() {
            if cursor + AdsStampHeader::LENGTH > body.len() {
                return Err(ClientError::UnexpectedResponse);
            }
            let stamp = AdsStampHeader::from_bytes(
                body[cursor..cursor + AdsStampHeader::LENGTH]
                    .try_into()
                    .unwrap(),
            );
            cursor += AdsStampHeader::LENGTH;
            let timestamp = stamp.timestamp().to_datetime();

            for _ in 0..stamp.samples() {
                if cursor + AdsNotificationSampleHeader::LENGTH > body.len() {
                    return Err(ClientError::UnexpectedResponse);
                }
                let sample_header = AdsNotificationSampleHeader::from_bytes(
                    body[cursor..cursor + AdsNotificationSampleHeader::LENGTH]
                        .try_into()
                        .unwrap(),
                );
                cursor += AdsNotificationSampleHeader::LENGTH;
                let sample_size = sample_header.sample_size() as usize;
                if cursor + sample_size > body.len() {
                    return Err(ClientError::UnexpectedResponse);
                }
                let data = body[cursor..cursor + sample_size].to_vec();
                cursor += sample_size;

                self.deliver(sample_header.handle(), timestamp, data, events, hide_console_warnings)
                    .await;
            }
        }
        Ok(())
    }

    async fn deliver(
        &self,
        server_handle: NotificationHandle,
        timestamp: DateTime<Utc>,
        data: Vec<u8>,
        events: &EventHub,
        hide_console_warnings: bool,
    ) {
        let callback = {
            let inner = self.inner.lock().await;
            inner
                .by_server_handle
                .get(&server_handle)
                .and_then(|local| inner.entries.get(local))
                .map(|entry| entry.callback.clone())
        };
        match callback {
            Some(callback) => callback(NotificationSample { timestamp, data }),
            None => {
                if self.delete_unknown_subscriptions {
                    let _ = self.delete_device_notification(server_handle).await;
                } else {
                    events.warn(
                        hide_console_warnings,
                        format!("notification for unknown handle {}", server_handle.as_u32()),
                    );
                }
            }
        }
    }

    async fn add_device_notification(&self, subscription: &Subscription) -> Result<NotificationHandle> {
        let request = AdsAddDeviceNotificationRequest::new(
            subscription.index_group,
            subscription.index_offset,
            subscription.length,
            subscription.transmission_mode,
            subscription.max_delay,
            subscription.cycle_time,
        );
        let frame = self
            .session
            .send_command(AdsCommand::AdsAddDeviceNotification, request.to_bytes().to_vec())
            .await?;
        if frame.body.len() < AdsAddDeviceNotificationResponse::LENGTH {
            return Err(ClientError::UnexpectedResponse);
        }
        let response = AdsAddDeviceNotificationResponse::from_bytes(
            frame.body[..AdsAddDeviceNotificationResponse::LENGTH]
                .try_into()
                .unwrap(),
        );
        if response.result() != AdsReturnCode::Ok {
            return Err(ClientError::Ads {
                code: response.result(),
            });
        }
        Ok(response.handle())
    }

    async fn delete_device_notification(&self, handle: NotificationHandle) -> Result<()> {
        let request = AdsDeleteDeviceNotificationRequest::new(handle);
        self.session
            .send_command(AdsCommand::AdsDeleteDeviceNotification, request.to_bytes().to_vec())
            .await?;
        Ok(())
    }
}
