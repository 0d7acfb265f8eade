use crate::data::{
    pivot_long_form, to_long_form, to_single_instrument_ohlc, CandleRow, CloseMatrix, DataFetcher,
    InstrumentSet, LongFormRow,
};
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn bounds(&self) -> [f64; 2] {
        [self.min, self.max]
    }

    fn validate(&self) -> Result<(), DashboardError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(DashboardError::PreconditionViolation(
                "price range must be finite".to_string(),
            ));
        }
        if self.min > self.max {
            return Err(DashboardError::PreconditionViolation(format!(
                "price range minimum {:.2} is above maximum {:.2}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    MultiLine,
    Candlestick,
}

impl ChartMode {
    pub fn label(&self) -> &'static str {
        match self {
            ChartMode::MultiLine => "Multi-line",
            ChartMode::Candlestick => "Candlestick",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ChartMode::MultiLine => ChartMode::Candlestick,
            ChartMode::Candlestick => ChartMode::MultiLine,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Companies(Vec<String>),
    Company(String),
}

/// Everything the host collects for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub day_count: u32,
    pub price_range: PriceRange,
    pub selection: Selection,
}

impl RenderParams {
    pub fn mode(&self) -> ChartMode {
        match self.selection {
            Selection::Companies(_) => ChartMode::MultiLine,
            Selection::Company(_) => ChartMode::Candlestick,
        }
    }

    fn validate(&self) -> Result<(), DashboardError> {
        if !(MIN_DAYS..=MAX_DAYS).contains(&self.day_count) {
            return Err(DashboardError::PreconditionViolation(format!(
                "day count {} is outside {MIN_DAYS}..={MAX_DAYS}",
                self.day_count
            )));
        }
        self.price_range.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderResult {
    Lines {
        series: Vec<LongFormRow>,
        /// Selected close prices, rows sorted by company name.
        table: CloseMatrix,
        selected: Vec<String>,
        price_range: PriceRange,
    },
    Candles {
        name: String,
        symbol: String,
        candles: Vec<CandleRow>,
        price_range: PriceRange,
    },
}

/// One full pass: validate, fetch (memoized), shape for the chosen mode.
pub async fn render(
    fetcher: &DataFetcher,
    instruments: &InstrumentSet,
    params: &RenderParams,
) -> Result<RenderResult, DashboardError> {
    params.validate()?;

    if let Selection::Company(name) = &params.selection {
        if !instruments.contains_name(name) {
            return Err(DashboardError::PreconditionViolation(format!(
                "unknown company {name}"
            )));
        }
    }
    if let Selection::Companies(names) = &params.selection {
        if names.is_empty() {
            return Err(DashboardError::NoSelection);
        }
    }

    let table = fetcher.fetch(params.day_count, instruments).await?;

    let result = match &params.selection {
        Selection::Companies(names) => {
            let matrix = table.close_matrix(instruments);
            let series = to_long_form(&matrix, names)?;
            RenderResult::Lines {
                table: pivot_long_form(&series).sorted_by_name(),
                series,
                selected: names.clone(),
                price_range: params.price_range,
            }
        }
        Selection::Company(name) => {
            let symbol = instruments.symbol_of(name).unwrap_or_default().to_string();
            let candles = to_single_instrument_ohlc(&table, &symbol)?;
            RenderResult::Candles {
                name: name.clone(),
                symbol,
                candles,
                price_range: params.price_range,
            }
        }
    };

    tracing::debug!(mode = params.mode().label(), days = params.day_count, "render pass complete");
    Ok(result)
}
