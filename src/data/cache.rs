use crate::data::instruments::{Instrument, InstrumentSet};
use crate::data::table::OhlcTable;
use crate::error::DashboardError;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

pub type FetchOutcome = Result<Arc<OhlcTable>, DashboardError>;

/// Identity of a fetch: the day count plus the instrument set, regardless of
/// the order the instruments were listed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    day_count: u32,
    instruments: BTreeSet<Instrument>,
}

impl FetchKey {
    pub fn new(day_count: u32, instruments: &InstrumentSet) -> Self {
        Self {
            day_count,
            instruments: instruments.iter().cloned().collect(),
        }
    }
}

/// Session-lifetime memo of fetch outcomes. Failures are kept as well, so a
/// failed key stays failed until the inputs change. Entries never expire.
#[derive(Default)]
pub struct FetchCache {
    entries: Mutex<HashMap<FetchKey, Arc<OnceCell<FetchOutcome>>>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored outcome for `key`, running `compute` only if no
    /// outcome exists yet. Concurrent callers with the same key wait on the
    /// single in-flight computation.
    pub async fn get_or_compute<F, Fut>(&self, key: FetchKey, compute: F) -> FetchOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(key.clone()).or_default().clone()
        };

        if cell.initialized() {
            tracing::debug!(day_count = key.day_count, "fetch cache hit");
        }

        cell.get_or_init(compute).await.clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}
