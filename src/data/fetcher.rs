use crate::data::cache::{FetchCache, FetchKey, FetchOutcome};
use crate::data::fetch::{fetch_window, MarketDataProvider};
use crate::data::instruments::InstrumentSet;
use crate::data::table::OhlcTable;
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// Fetches daily OHLC tables through a provider, memoized per
/// (day count, instrument set) for the lifetime of the fetcher.
pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: FetchCache,
    today: fn() -> NaiveDate,
}

impl DataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            cache: FetchCache::new(),
            today: || Local::now().date_naive(),
        }
    }

    #[cfg(test)]
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn fetch(&self, day_count: u32, instruments: &InstrumentSet) -> FetchOutcome {
        let key = FetchKey::new(day_count, instruments);
        let outcome = self
            .cache
            .get_or_compute(key, || self.download(day_count, instruments))
            .await;
        tracing::debug!(entries = self.cache.len(), "fetch cache size");
        outcome
    }

    #[cfg(test)]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    async fn download(&self, day_count: u32, instruments: &InstrumentSet) -> FetchOutcome {
        let (start, end) = fetch_window(day_count, (self.today)())?;
        let symbols = instruments.symbols();

        tracing::info!(
            provider = self.provider.name(),
            %start,
            %end,
            symbols = ?symbols,
            "downloading daily bars"
        );

        let frame = self
            .provider
            .download(&symbols, start, end)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "download failed");
                err
            })?;

        let table = OhlcTable::from_frame(frame, &symbols)?;
        tracing::info!(rows = table.len(), "daily bars ready");
        Ok(Arc::new(table))
    }
}
