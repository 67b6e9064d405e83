//! A client library for the ADS protocol: framing/multiplexing over one
//! long-lived AMS/TCP connection, a symbol/data-type metadata cache, a
//! dynamic [`Value`] converter, a notification subscription manager, and a
//! sum-command multiplexer.

pub mod cache;
pub mod client;
pub mod convert;
pub mod errors;
pub mod events;
pub mod session;
pub mod settings;
pub mod subscription;
pub mod sum;

pub use client::{Client, ReadOutcome};
pub use convert::{TypeError, Value};
pub use errors::{ClientError, FrameError, Result};
pub use events::{ClientEvent, EventHub};
pub use settings::ClientSettings;
pub use subscription::{SampleCallback, Subscription, SubscriptionHandle};
pub use tcads_core::{
    ads::{AdsReturnCode, IndexGroup, IndexOffset},
    ams::{AmsAddr, AmsNetId, AmsPort},
};
