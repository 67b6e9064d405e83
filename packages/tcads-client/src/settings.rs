use std::time::Duration;
use tcads_core::ams::{AmsNetId, AmsPort};
use tcads_core::io::AMS_FRAME_MAX_LEN;

/// Configuration for a [`Client`](crate::client::Client).
///
/// Mirrors the settings surface of the underlying protocol: which target to
/// dial, how long to wait for a response, and how the client behaves around
/// caching, subscriptions, and reconnects.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// The AMS Net ID of the target device.
    pub target_ams_net_id: AmsNetId,

    /// The AMS port of the target device (e.g. `851` for the first PLC runtime).
    pub target_ads_port: AmsPort,

    /// The local AMS port to request from the router. `None` asks the router
    /// to assign a dynamic port.
    pub local_ads_port: Option<AmsPort>,

    /// How long to wait for a response to any single request before failing
    /// with [`Timeout`](crate::errors::ClientError::Timeout).
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub timeout: Duration,

    /// If `true`, skips the automatic symbol/data-type upload and cache
    /// population; callers are responsible for raw index-group/offset I/O.
    pub raw_client: bool,

    /// If `true`, suppresses the formatted `tracing::warn!` echo of warning
    /// events (the events themselves are never suppressed).
    pub hide_console_warnings: bool,

    /// If `true`, a [`DeviceNotification`](tcads_core::ams::AmsCommand) sample
    /// for an unrecognised handle is automatically deleted server-side.
    pub delete_unknown_subscriptions: bool,

    /// If `true`, decoding an enum-typed value returns `Value::Enum{name,value}`
    /// when the numeric value matches a known variant, instead of the bare number.
    pub objectify_enumerations: bool,

    /// If `true`, a dropped connection triggers an automatic reconnect loop
    /// with exponential backoff.
    pub auto_reconnect: bool,

    /// Baseline delay between reconnect attempts (doubles up to a 30s cap).
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub reconnect_interval: Duration,

    /// The largest AMS frame payload this client will accept from the
    /// router before rejecting it as oversize. Defaults to
    /// [`AMS_FRAME_MAX_LEN`] (16MiB), large enough for a real PLC's
    /// `SymbolUpload`/`DataTypeUpload` response.
    pub max_frame_len: usize,
}

impl ClientSettings {
    /// Creates settings targeting `net_id:port` with every other field at its default.
    pub fn new(target_ams_net_id: AmsNetId, target_ads_port: AmsPort) -> Self {
        Self {
            target_ams_net_id,
            target_ads_port,
            ..Self::default_without_target()
        }
    }

    fn default_without_target() -> Self {
        Self {
            target_ams_net_id: AmsNetId::new(0, 0, 0, 0, 0, 0),
            target_ads_port: 0,
            local_ads_port: None,
            timeout: Duration::from_millis(2000),
            raw_client: false,
            hide_console_warnings: false,
            delete_unknown_subscriptions: true,
            objectify_enumerations: true,
            auto_reconnect: true,
            reconnect_interval: Duration::from_millis(2000),
            max_frame_len: AMS_FRAME_MAX_LEN,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::default_without_target()
    }
}

#[cfg(feature = "serde")]
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
