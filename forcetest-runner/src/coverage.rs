//! The process-wide coverage store.

use forcetest_metadata::CoverageRecord;
use indexmap::IndexMap;
use std::sync::Mutex;

/// The most recent coverage record per artifact id, kept for the life of the
/// host process.
///
/// Unlike the usual global-singleton shape for this kind of store, the map is
/// an explicitly owned value the host injects into the coordinator, so runs
/// can be serialized or isolated as the host sees fit. The reporter is the
/// only writer; later reporting/UI layers read through [`get`](Self::get) and
/// [`artifact_name`](Self::artifact_name). Entries are overwritten per id on
/// each new run and never cleared.
#[derive(Debug, Default)]
pub struct CoverageMap {
    inner: Mutex<IndexMap<String, CoverageRecord>>,
}

impl CoverageMap {
    /// Creates an empty coverage map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a record keyed by its id. Last write wins; there is no merge.
    pub fn record(&self, record: CoverageRecord) {
        let mut inner = self.inner.lock().expect("coverage map lock poisoned");
        inner.insert(record.id.clone(), record);
    }

    /// Returns a copy of the record for the given artifact id, if any.
    pub fn get(&self, artifact_id: &str) -> Option<CoverageRecord> {
        let inner = self.inner.lock().expect("coverage map lock poisoned");
        inner.get(artifact_id).cloned()
    }

    /// Returns the artifact name recorded for the given id, if any.
    pub fn artifact_name(&self, artifact_id: &str) -> Option<String> {
        let inner = self.inner.lock().expect("coverage map lock poisoned");
        inner.get(artifact_id).map(|record| record.name.clone())
    }

    /// The number of artifacts with recorded coverage.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("coverage map lock poisoned").len()
    }

    /// Returns true if no coverage has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
