//! PersistenceClient trait and implementations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use relay_core::DetectionEvent;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

/// Durable store for detection records.
///
/// Inserts ignore the caller's `detection_id` and return the one the store
/// assigned.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    async fn insert(&self, event: &DetectionEvent) -> Result<i64>;

    /// Every stored detection, oldest first.
    async fn list(&self) -> Result<Vec<DetectionEvent>>;
}

// ------------------------------------------------------------------ //
//  PgDetectionStore (production)                                      //
// ------------------------------------------------------------------ //

/// PostgreSQL-backed store over the `detected_animals` table:
///
/// ```sql
/// CREATE TABLE detected_animals (
///     detection_id    BIGSERIAL PRIMARY KEY,
///     camera_uuid     BIGINT NOT NULL,
///     detection_time  TIMESTAMP NOT NULL,
///     detected_animal TEXT NOT NULL,
///     temperature     DOUBLE PRECISION NOT NULL
/// );
/// ```
pub struct PgDetectionStore {
    pool: PgPool,
}

impl PgDetectionStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl PersistenceClient for PgDetectionStore {
    async fn insert(&self, event: &DetectionEvent) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO detected_animals (camera_uuid, detection_time, detected_animal, temperature)
            VALUES ($1, $2::timestamp, $3, $4)
            RETURNING detection_id
            "#,
        )
        .bind(event.device_id)
        .bind(&event.detected_at)
        .bind(&event.species)
        .bind(event.temperature)
        .fetch_one(&self.pool)
        .await
        .context("INSERT into detected_animals failed")?;

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<DetectionEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT detection_id, camera_uuid, detection_time::text, detected_animal, temperature
            FROM detected_animals
            ORDER BY detection_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("SELECT from detected_animals failed")?;

        rows.iter()
            .map(|row| -> Result<DetectionEvent> {
                Ok(DetectionEvent {
                    detection_id: row.try_get(0)?,
                    device_id: row.try_get(1)?,
                    detected_at: row.try_get(2)?,
                    species: row.try_get(3)?,
                    temperature: row.try_get(4)?,
                })
            })
            .collect()
    }
}

// ------------------------------------------------------------------ //
//  FakeDetectionStore (for tests)                                     //
// ------------------------------------------------------------------ //

/// In-memory store that records inserted events for test assertions.
///
/// Inserts for a species registered with [`FakeDetectionStore::fail_species`]
/// are rejected.
#[derive(Debug, Default, Clone)]
pub struct FakeDetectionStore {
    rows: Arc<Mutex<Vec<DetectionEvent>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeDetectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_species(&self, species: &str) {
        self.failing.lock().unwrap().insert(species.to_string());
    }

    /// Non-destructive snapshot of the stored rows.
    pub fn snapshot(&self) -> Vec<DetectionEvent> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceClient for FakeDetectionStore {
    async fn insert(&self, event: &DetectionEvent) -> Result<i64> {
        if self.failing.lock().unwrap().contains(&event.species) {
            bail!("insert rejected for {}", event.species);
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(DetectionEvent {
            detection_id: id,
            ..event.clone()
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<DetectionEvent>> {
        Ok(self.snapshot())
    }
}
