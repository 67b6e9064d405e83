//! Connects to a local AMS router, drives a PLC through a stop/start cycle,
//! then reads and writes `MAIN.nCount` through a variable handle.
//!
//! Mirrors the raw-protocol walkthrough this crate grew out of, but through
//! the public [`tcads::client::Client`] facade instead of hand-matched frames.

use std::net::SocketAddr;
use std::time::Duration;

use tcads::client::{AmsNetId, Client, ClientSettings};
use tcads::core::ads::AdsState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let router_addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:48898".to_string())
        .parse()?;
    let target_net_id = std::env::args()
        .nth(2)
        .map(|s| s.parse().expect("net id as a.b.c.d.e.f"))
        .unwrap_or_else(|| AmsNetId::new(127, 0, 0, 1, 1, 1));

    let settings = ClientSettings::new(target_net_id, 851);
    let client = Client::new(settings, router_addr);
    client.connect().await?;

    let (version, name) = client.read_device_info().await?;
    println!("connected to {} (v{}.{}.{})", name.as_str(), version.major(), version.minor(), version.build());

    let (ads_state, _) = client.read_state().await?;
    println!("PLC state: {ads_state:?}");
    if ads_state == AdsState::Run {
        println!("stopping PLC...");
        client.write_control(AdsState::Stop, 0, &[]).await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        println!("starting PLC...");
        client.write_control(AdsState::Run, 0, &[]).await?;
    }

    let handle = client.create_variable_handle("MAIN.nCount").await?;
    println!("MAIN.nCount handle = {handle}");

    client.write_by_handle(handle, &42u32.to_le_bytes()).await?;
    let data = client.read_by_handle(handle, 4).await?;
    println!("MAIN.nCount = {}", u32::from_le_bytes(data.try_into().unwrap()));
    client.release_variable_handle(handle).await?;

    client.disconnect().await;
    Ok(())
}
