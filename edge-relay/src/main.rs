//! Edge relay entry point.
//!
//! Listens for UDP detection frames from the camera, drops frames from
//! unapproved sources and untracked species, stamps the device id and
//! forwards the rest to the aggregator through a retrying delivery queue.
//! A small HTTP listener receives tracked-species updates.
//!
//! See [`edge_relay::settings`] for the environment variables.

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::{Context, Result};
use relay_core::{DeliveryConfig, DeliveryQueue, HttpTransport};
use tokio::net::{TcpListener, UdpSocket};
use tracing::info;

use edge_relay::authorizer::AddressAuthorizer;
use edge_relay::filter::EdgeFilter;
use edge_relay::relay::EdgeRelay;
use edge_relay::settings::Settings;
use edge_relay::{ingress, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("edge_relay=info".parse()?)
                .add_directive("relay_core=info".parse()?),
        )
        .json()
        .init();

    let settings = Settings::from_env().context("invalid edge relay environment")?;

    let upstream = DeliveryQueue::spawn(
        settings.aggregator_addr.as_str(),
        Arc::new(HttpTransport::default()),
        DeliveryConfig::upstream().with_backoff(settings.backoff.clone()),
    );

    let (filter, updater) = EdgeFilter::new(settings.tracked_species.clone());
    let relay = EdgeRelay::new(settings.device_id, filter, upstream);
    let authorizer = AddressAuthorizer::new(settings.approved_cameras.clone());

    let socket = UdpSocket::bind(&settings.camera_addr)
        .await
        .with_context(|| format!("cannot bind camera ingress on {}", settings.camera_addr))?;
    info!(addr = settings.camera_addr, "camera ingress bound");

    let listener = TcpListener::bind(&settings.config_addr)
        .await
        .with_context(|| format!("cannot bind config receiver on {}", settings.config_addr))?;
    info!(addr = settings.config_addr, "config receiver listening");

    info!(
        device_id = settings.device_id,
        aggregator = settings.aggregator_addr,
        species = ?settings.tracked_species.names(),
        "edge relay started"
    );

    tokio::select! {
        res = axum::serve(listener, routes::router(updater)).into_future() => {
            res.context("config receiver stopped")?;
        }
        res = ingress::serve(socket, authorizer, relay) => {
            res.context("camera ingress stopped")?;
        }
    }

    Ok(())
}
