//! Immutable dataset snapshots and the store that publishes them.

use std::{
    ops::Deref,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, SystemTime},
};

use tracing::{info, warn};

use super::entities::ComparableRecord;

/// A loaded comparable dataset. Records are never mutated after load.
#[derive(Clone, Debug)]
pub struct DatasetSnapshot {
    records: Vec<ComparableRecord>,
    source: Option<PathBuf>,
    loaded_at: SystemTime,
}

impl DatasetSnapshot {
    pub fn new(records: Vec<ComparableRecord>) -> Self {
        Self {
            records,
            source: None,
            loaded_at: SystemTime::now(),
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn records(&self) -> &[ComparableRecord] {
        &self.records
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    pub fn age(&self) -> Duration {
        self.loaded_at.elapsed().unwrap_or_default()
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }

    /// Distinct suburbs in first-seen order.
    pub fn suburbs(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            let suburb = record.suburb.as_str();
            if !suburb.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(suburb)) {
                seen.push(suburb);
            }
        }
        seen
    }
}

impl Deref for DatasetSnapshot {
    type Target = [ComparableRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// Shares the current snapshot between readers. Publishing swaps the whole
/// snapshot, so a reader holds either the old or the new one and never a mix.
#[derive(Debug)]
pub struct DatasetStore {
    current: RwLock<Arc<DatasetSnapshot>>,
}

impl DatasetStore {
    pub fn new(snapshot: DatasetSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn current(&self) -> Arc<DatasetSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the snapshot that was replaced.
    pub fn publish(&self, snapshot: DatasetSnapshot) -> Arc<DatasetSnapshot> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            records = next.len(),
            previous = guard.len(),
            "published dataset snapshot"
        );
        std::mem::replace(&mut *guard, next)
    }

    /// Re-reads the current snapshot's source with `load` and publishes the
    /// result. On failure the current snapshot stays in place.
    pub fn reload_with<F, E>(&self, load: F) -> Result<Arc<DatasetSnapshot>, ReloadError<E>>
    where
        F: FnOnce(&Path) -> Result<DatasetSnapshot, E>,
    {
        let current = self.current();
        let Some(source) = current.source() else {
            return Err(ReloadError::NoSource);
        };

        match load(source) {
            Ok(snapshot) => {
                self.publish(snapshot);
                Ok(self.current())
            }
            Err(err) => {
                warn!(
                    source = %source.display(),
                    age = %current.age_string(),
                    "dataset reload failed; keeping current snapshot"
                );
                Err(ReloadError::Load(err))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReloadError<E> {
    #[error("snapshot has no source file to reload from")]
    NoSource,
    #[error("failed to load dataset: {0}")]
    Load(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(prices: &[u64]) -> DatasetSnapshot {
        DatasetSnapshot::new(
            prices
                .iter()
                .map(|&price| ComparableRecord::new("1 Test St", "Kippax").with_price(price))
                .collect(),
        )
    }

    #[test]
    fn readers_keep_their_snapshot_across_publish() {
        let store = DatasetStore::new(snapshot(&[600_000]));
        let before = store.current();
        let replaced = store.publish(snapshot(&[700_000, 800_000]));

        assert_eq!(before.len(), 1);
        assert!(Arc::ptr_eq(&before, &replaced));
        assert_eq!(store.current().len(), 2);
    }

    #[test]
    fn reload_without_source_is_rejected() {
        let store = DatasetStore::new(snapshot(&[600_000]));
        let result = store.reload_with(|_| Ok::<_, std::io::Error>(snapshot(&[])));
        assert!(matches!(result, Err(ReloadError::NoSource)));
    }

    #[test]
    fn failed_reload_keeps_current_snapshot() {
        let store = DatasetStore::new(snapshot(&[600_000]).with_source("sales.csv"));
        let result = store.reload_with(|_| {
            Err::<DatasetSnapshot, _>(std::io::Error::other("disk gone"))
        });
        assert!(matches!(result, Err(ReloadError::Load(_))));
        assert_eq!(store.current().len(), 1);
    }

    #[test]
    fn successful_reload_publishes_new_snapshot() {
        let store = DatasetStore::new(snapshot(&[600_000]).with_source("sales.csv"));
        let reloaded = store
            .reload_with(|path| {
                assert_eq!(path, Path::new("sales.csv"));
                Ok::<_, std::io::Error>(snapshot(&[1, 2, 3]).with_source(path))
            })
            .unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(store.current().len(), 3);
    }

    #[test]
    fn suburbs_are_distinct_case_insensitively() {
        let snapshot = DatasetSnapshot::new(vec![
            ComparableRecord::new("1 A St", "Kippax"),
            ComparableRecord::new("2 B St", "KIPPAX"),
            ComparableRecord::new("3 C St", "Kaleen"),
        ]);
        assert_eq!(snapshot.suburbs(), ["Kippax", "Kaleen"]);
    }
}
