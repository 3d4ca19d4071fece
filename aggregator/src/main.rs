//! Aggregator entry point.
//!
//! Accepts detection events from edge relays over HTTP, persists them to
//! PostgreSQL through a bounded inbound queue, and watches the species file
//! to push tracked-species changes to every registered edge.
//!
//! See [`aggregator::settings`] for the environment variables.

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::{Context, Result};
use relay_core::{DeliveryConfig, DeliveryQueue, HttpTransport, TrackedSpecies};
use tokio::net::TcpListener;
use tracing::info;

use aggregator::inbound::InboundQueue;
use aggregator::routes::{self, AppState};
use aggregator::settings::Settings;
use aggregator::store::{PersistenceClient, PgDetectionStore};
use aggregator::watcher::{FileSpeciesSource, SpeciesListWatcher};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aggregator=info".parse()?)
                .add_directive("relay_core=info".parse()?),
        )
        .json()
        .init();

    let settings = Settings::from_env().context("invalid aggregator environment")?;

    let store: Arc<dyn PersistenceClient> = Arc::new(PgDetectionStore::connect(&settings.database_url).await?);
    let inbound = InboundQueue::spawn(store.clone(), settings.inbound_capacity);

    let transport = Arc::new(HttpTransport::default());
    let edges: Vec<DeliveryQueue<TrackedSpecies>> = settings
        .edges
        .iter()
        .map(|edge| {
            DeliveryQueue::spawn(
                edge.as_str(),
                transport.clone(),
                DeliveryConfig::downstream().with_backoff(settings.backoff.clone()),
            )
        })
        .collect();

    let watcher = SpeciesListWatcher::start(FileSpeciesSource::new(&settings.species_file), edges).await?;

    let listener = TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("cannot bind aggregator on {}", settings.listen_addr))?;
    info!(
        addr = settings.listen_addr,
        edges = ?settings.edges,
        species_file = %settings.species_file.display(),
        "aggregator listening"
    );

    let app = routes::router(AppState { inbound, store });

    tokio::select! {
        res = axum::serve(listener, app).into_future() => {
            res.context("aggregator server stopped")?;
        }
        res = watcher.run(settings.poll_interval) => {
            res?;
        }
    }

    Ok(())
}
