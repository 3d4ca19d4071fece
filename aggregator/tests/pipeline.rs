//! Aggregator flows over loopback sockets: detections delivered by a real
//! upstream queue end up in the store, and species-file changes reach a
//! listening edge.

use std::future::IntoFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use relay_core::model::EXCHANGE_PATH;
use relay_core::{DeliveryConfig, DeliveryQueue, DetectionEvent, HttpTransport, TrackedSpecies};
use tokio::net::TcpListener;

use aggregator::inbound::{InboundQueue, DEFAULT_INBOUND_CAPACITY};
use aggregator::routes::{self, AppState};
use aggregator::store::{FakeDetectionStore, PersistenceClient};
use aggregator::watcher::{FileSpeciesSource, SpeciesListWatcher};

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(axum::serve(listener, app).into_future());
    addr
}

async fn eventually(mut done: impl FnMut() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

fn detection(species: &str) -> DetectionEvent {
    DetectionEvent {
        detection_id: 0,
        device_id: 352,
        detected_at: "2022-06-01 10:00:00.000001".into(),
        species: species.into(),
        temperature: 19.0,
    }
}

#[tokio::test]
async fn delivered_detections_are_persisted_in_order() {
    let fake = FakeDetectionStore::new();
    let store: Arc<dyn PersistenceClient> = Arc::new(fake.clone());
    let addr = serve(routes::router(AppState {
        inbound: InboundQueue::spawn(store.clone(), DEFAULT_INBOUND_CAPACITY),
        store,
    }))
    .await;

    let upstream = DeliveryQueue::spawn(
        addr.as_str(),
        Arc::new(HttpTransport::default()),
        DeliveryConfig::upstream(),
    );
    for species in ["Bear", "Racoon", "Gazelle"] {
        upstream.enqueue(detection(species)).await.unwrap();
    }

    eventually(|| fake.snapshot().len() == 3).await;
    let rows = fake.snapshot();
    assert_eq!(
        rows.iter().map(|r| r.species.as_str()).collect::<Vec<_>>(),
        ["Bear", "Racoon", "Gazelle"]
    );
    assert!(rows.iter().all(|r| r.device_id == 352));
    assert_eq!(rows.iter().map(|r| r.detection_id).collect::<Vec<_>>(), [1, 2, 3]);
}

type Pushed = Arc<Mutex<Vec<TrackedSpecies>>>;

async fn record(State(seen): State<Pushed>, Json(list): Json<TrackedSpecies>) -> &'static str {
    seen.lock().unwrap().push(list);
    "species list updated"
}

#[tokio::test]
async fn species_file_changes_reach_the_edge() {
    let pushed: Pushed = Arc::default();
    let edge_addr = serve(
        Router::new()
            .route(EXCHANGE_PATH, post(record))
            .with_state(pushed.clone()),
    )
    .await;

    let path = std::env::temp_dir().join(format!("aggregator-species-{}.txt", std::process::id()));
    tokio::fs::write(&path, "Bear\nFox\n").await.unwrap();

    let edge = DeliveryQueue::spawn(
        edge_addr.as_str(),
        Arc::new(HttpTransport::default()),
        DeliveryConfig::downstream(),
    );
    let mut watcher = SpeciesListWatcher::start(FileSpeciesSource::new(&path), vec![edge])
        .await
        .unwrap();

    eventually(|| pushed.lock().unwrap().len() == 1).await;

    tokio::fs::write(&path, "Bear\nFox\nOwl\n").await.unwrap();
    assert!(watcher.poll().await.unwrap());
    eventually(|| pushed.lock().unwrap().len() == 2).await;

    tokio::fs::remove_file(&path).await.unwrap();

    let expected: Vec<TrackedSpecies> = vec![
        ["Bear", "Fox"].into_iter().collect(),
        ["Bear", "Fox", "Owl"].into_iter().collect(),
    ];
    assert_eq!(*pushed.lock().unwrap(), expected);
}
