//! Tracked-species watcher.
//!
//! Polls a [`SpeciesSource`] and pushes the list to every registered edge
//! whenever it changes. The comparison is order-sensitive and an empty read
//! is never propagated.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_core::{DeliveryQueue, TrackedSpecies};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default interval between two reads of the species source.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[async_trait]
pub trait SpeciesSource: Send + Sync {
    async fn read(&self) -> Result<TrackedSpecies>;
}

/// Plain-text species file, one name per line. Lines are trimmed and blank
/// lines skipped.
pub struct FileSpeciesSource {
    path: PathBuf,
}

impl FileSpeciesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SpeciesSource for FileSpeciesSource {
    async fn read(&self) -> Result<TrackedSpecies> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("cannot read species file {}", self.path.display()))?;
        Ok(parse_species(&text))
    }
}

fn parse_species(text: &str) -> TrackedSpecies {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub struct SpeciesListWatcher<S> {
    source: S,
    edges: Vec<DeliveryQueue<TrackedSpecies>>,
    previous: TrackedSpecies,
}

impl<S: SpeciesSource> SpeciesListWatcher<S> {
    /// Take the initial snapshot and, if it is non-empty, send it to every
    /// edge straight away.
    pub async fn start(source: S, edges: Vec<DeliveryQueue<TrackedSpecies>>) -> Result<Self> {
        let previous = source.read().await.context("initial species read failed")?;
        let watcher = Self {
            source,
            edges,
            previous,
        };
        if !watcher.previous.is_empty() {
            watcher.propagate(&watcher.previous).await?;
        }
        info!(
            species = ?watcher.previous.names(),
            edges = watcher.edges.len(),
            "species watcher started"
        );
        Ok(watcher)
    }

    /// Read the source once. Returns `true` when a new list was sent out.
    pub async fn poll(&mut self) -> Result<bool> {
        let current = self.source.read().await?;
        if current.is_empty() {
            debug!("species source is empty, keeping previous list");
            return Ok(false);
        }
        if current == self.previous {
            return Ok(false);
        }

        self.propagate(&current).await?;
        info!(species = ?current.names(), "tracked species changed");
        self.previous = current;
        Ok(true)
    }

    pub fn previous(&self) -> &TrackedSpecies {
        &self.previous
    }

    /// Poll every `every` until the source fails.
    pub async fn run(mut self, every: Duration) -> Result<()> {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll().await.context("species watcher stopped")?;
        }
    }

    async fn propagate(&self, species: &TrackedSpecies) -> Result<()> {
        for edge in &self.edges {
            edge.enqueue(species.clone()).await?;
            debug!(edge = edge.target(), "species list queued for edge");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use anyhow::bail;
    use tokio::sync::mpsc;

    use super::*;

    /// Source that replays a fixed sequence of reads, then fails.
    struct ScriptedSource {
        reads: Mutex<VecDeque<Vec<&'static str>>>,
    }

    impl ScriptedSource {
        fn new(reads: &[&[&'static str]]) -> Self {
            Self {
                reads: Mutex::new(reads.iter().map(|r| r.to_vec()).collect()),
            }
        }
    }

    #[async_trait]
    impl SpeciesSource for ScriptedSource {
        async fn read(&self) -> Result<TrackedSpecies> {
            match self.reads.lock().unwrap().pop_front() {
                Some(names) => Ok(names.into_iter().collect()),
                None => bail!("source exhausted"),
            }
        }
    }

    fn edges(n: usize) -> (Vec<DeliveryQueue<TrackedSpecies>>, Vec<mpsc::Receiver<TrackedSpecies>>) {
        (0..n)
            .map(|i| DeliveryQueue::channel(format!("edge-{i}:3555"), 25))
            .unzip()
    }

    fn drained(rx: &mut mpsc::Receiver<TrackedSpecies>) -> Vec<TrackedSpecies> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn list(names: &[&str]) -> TrackedSpecies {
        names.iter().copied().collect()
    }

    #[test]
    fn species_file_lines_are_trimmed_and_blanks_skipped() {
        let parsed = parse_species("Bear\n  Fox  \n\n\r\nGazelle\n");
        assert_eq!(parsed, list(&["Bear", "Fox", "Gazelle"]));
    }

    #[tokio::test]
    async fn initial_snapshot_goes_to_every_edge() {
        let (queues, mut rxs) = edges(2);
        let watcher = SpeciesListWatcher::start(ScriptedSource::new(&[&["Bear", "Fox"]]), queues)
            .await
            .unwrap();

        assert_eq!(watcher.previous(), &list(&["Bear", "Fox"]));
        for rx in &mut rxs {
            assert_eq!(drained(rx), [list(&["Bear", "Fox"])]);
        }
    }

    #[tokio::test]
    async fn empty_initial_snapshot_is_not_sent() {
        let (queues, mut rxs) = edges(1);
        SpeciesListWatcher::start(ScriptedSource::new(&[&[]]), queues)
            .await
            .unwrap();
        assert!(drained(&mut rxs[0]).is_empty());
    }

    #[tokio::test]
    async fn only_changes_are_propagated() {
        let (queues, mut rxs) = edges(1);
        let source = ScriptedSource::new(&[&["Bear", "Fox"], &["Bear", "Fox"], &["Bear", "Fox", "Owl"]]);
        let mut watcher = SpeciesListWatcher::start(source, queues).await.unwrap();
        drained(&mut rxs[0]);

        assert!(!watcher.poll().await.unwrap());
        assert!(drained(&mut rxs[0]).is_empty());

        assert!(watcher.poll().await.unwrap());
        assert_eq!(drained(&mut rxs[0]), [list(&["Bear", "Fox", "Owl"])]);
        assert_eq!(watcher.previous(), &list(&["Bear", "Fox", "Owl"]));
    }

    #[tokio::test]
    async fn reordering_counts_as_a_change() {
        let (queues, mut rxs) = edges(1);
        let source = ScriptedSource::new(&[&["Bear", "Fox"], &["Fox", "Bear"]]);
        let mut watcher = SpeciesListWatcher::start(source, queues).await.unwrap();
        drained(&mut rxs[0]);

        assert!(watcher.poll().await.unwrap());
        assert_eq!(drained(&mut rxs[0]), [list(&["Fox", "Bear"])]);
    }

    #[tokio::test]
    async fn empty_read_keeps_previous() {
        let (queues, mut rxs) = edges(1);
        let source = ScriptedSource::new(&[&["Bear"], &[], &["Bear"]]);
        let mut watcher = SpeciesListWatcher::start(source, queues).await.unwrap();
        drained(&mut rxs[0]);

        assert!(!watcher.poll().await.unwrap());
        assert_eq!(watcher.previous(), &list(&["Bear"]));

        // Same as before the empty read, so still no change.
        assert!(!watcher.poll().await.unwrap());
        assert!(drained(&mut rxs[0]).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_polls_on_interval_and_stops_on_read_failure() {
        let (queues, mut rxs) = edges(1);
        let source = ScriptedSource::new(&[&["Bear"], &["Bear", "Fox"]]);
        let watcher = SpeciesListWatcher::start(source, queues).await.unwrap();
        drained(&mut rxs[0]);

        let started = Instant::now();
        let result = watcher.run(DEFAULT_POLL_INTERVAL).await;

        assert!(result.is_err());
        assert_eq!(started.elapsed(), DEFAULT_POLL_INTERVAL * 2);
        assert_eq!(drained(&mut rxs[0]), [list(&["Bear", "Fox"])]);
    }

    #[tokio::test]
    async fn file_source_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("species-{}.txt", std::process::id()));
        tokio::fs::write(&path, "Bear\nRacoon\n").await.unwrap();

        let species = FileSpeciesSource::new(&path).read().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(species, list(&["Bear", "Racoon"]));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = FileSpeciesSource::new("/nonexistent/species.txt");
        assert!(source.read().await.is_err());
    }
}
