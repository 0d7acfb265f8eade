pub mod cache;
pub mod fetch;
pub mod fetcher;
pub mod instruments;
pub mod shape;
pub mod table;

pub use fetch::{YahooProvider, DEFAULT_BASE_URL};
pub use fetcher::DataFetcher;
pub use instruments::{default_instruments, Instrument, InstrumentSet};
pub use shape::{
    pivot_long_form, to_long_form, to_single_instrument_ohlc, CandleDirection, CandleRow,
    LongFormRow,
};
pub use table::CloseMatrix;
