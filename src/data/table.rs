use crate::data::instruments::InstrumentSet;
use crate::error::DashboardError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
}

impl Field {
    pub fn all() -> [Field; 4] {
        [Field::Open, Field::High, Field::Low, Field::Close]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
        }
    }
}

/// One provider column. `symbol` is `None` when the provider answered a
/// single-symbol request without the per-symbol grouping level.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub field: Field,
    pub symbol: Option<String>,
    pub values: Vec<Option<f64>>,
}

/// Table exactly as a provider hands it back: dates may be unsorted or
/// repeated and every column is aligned to `dates`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadFrame {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<FrameColumn>,
}

impl DownloadFrame {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcSeries {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
}

impl OhlcSeries {
    fn missing(len: usize) -> Self {
        Self {
            open: vec![None; len],
            high: vec![None; len],
            low: vec![None; len],
            close: vec![None; len],
        }
    }

    pub fn field(&self, field: Field) -> &[Option<f64>] {
        match field {
            Field::Open => &self.open,
            Field::High => &self.high,
            Field::Low => &self.low,
            Field::Close => &self.close,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut Vec<Option<f64>> {
        match field {
            Field::Open => &mut self.open,
            Field::High => &mut self.high,
            Field::Low => &mut self.low,
            Field::Close => &mut self.close,
        }
    }
}

/// Daily OHLC prices keyed by ticker symbol. Dates are ascending and unique,
/// every series vector has one slot per date, and every requested symbol
/// carries all four fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcTable {
    dates: Vec<NaiveDate>,
    series: BTreeMap<String, OhlcSeries>,
}

impl OhlcTable {
    pub fn from_frame(frame: DownloadFrame, symbols: &[String]) -> Result<Self, DashboardError> {
        if frame.is_empty() {
            return Err(DashboardError::EmptyResult(
                "no trading data in the requested window".to_string(),
            ));
        }

        let dates: Vec<NaiveDate> = frame
            .dates
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let slot: BTreeMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(idx, d)| (*d, idx)).collect();

        let mut series: BTreeMap<String, OhlcSeries> = symbols
            .iter()
            .map(|s| (s.clone(), OhlcSeries::missing(dates.len())))
            .collect();

        for column in frame.columns {
            if column.values.len() != frame.dates.len() {
                return Err(DashboardError::FetchFailed(format!(
                    "{} column has {} values for {} dates",
                    column.field.label(),
                    column.values.len(),
                    frame.dates.len()
                )));
            }

            let symbol = match (column.symbol, symbols) {
                (Some(symbol), _) => symbol,
                (None, [only]) => only.clone(),
                (None, _) => {
                    return Err(DashboardError::FetchFailed(format!(
                        "ungrouped {} column in a {}-symbol response",
                        column.field.label(),
                        symbols.len()
                    )))
                }
            };

            let Some(target) = series.get_mut(&symbol) else {
                tracing::debug!(%symbol, "dropping column for unrequested symbol");
                continue;
            };

            let slots = target.field_mut(column.field);
            for (date, value) in frame.dates.iter().zip(column.values) {
                if value.is_some() {
                    slots[slot[date]] = value;
                }
            }
        }

        Ok(Self { dates, series })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn series(&self, symbol: &str) -> Option<&OhlcSeries> {
        self.series.get(symbol)
    }

    /// Close prices with display names as rows, in instrument-set order.
    pub fn close_matrix(&self, instruments: &InstrumentSet) -> CloseMatrix {
        let rows = instruments
            .symbols()
            .iter()
            .filter_map(|symbol| {
                let series = self.series.get(symbol)?;
                let name = instruments.name_of(symbol)?;
                Some(MatrixRow {
                    name: name.to_string(),
                    values: series.field(Field::Close).to_vec(),
                })
            })
            .collect();
        CloseMatrix {
            dates: self.dates.clone(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Instruments as rows, dates as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseMatrix {
    dates: Vec<NaiveDate>,
    rows: Vec<MatrixRow>,
}

impl CloseMatrix {
    pub fn new(dates: Vec<NaiveDate>, rows: Vec<MatrixRow>) -> Self {
        Self { dates, rows }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn select(&self, names: &[String]) -> Result<CloseMatrix, DashboardError> {
        let rows = names
            .iter()
            .map(|name| {
                self.row(name).cloned().ok_or_else(|| {
                    DashboardError::PreconditionViolation(format!("unknown company {name}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CloseMatrix {
            dates: self.dates.clone(),
            rows,
        })
    }

    pub fn sorted_by_name(mut self) -> Self {
        self.rows.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }
}
