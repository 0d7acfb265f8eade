use crate::data::table::{CloseMatrix, MatrixRow, OhlcTable};
use crate::error::DashboardError;
use chrono::NaiveDate;

/// One observation of the multi-line view. A missing price is a gap, not zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LongFormRow {
    pub date: NaiveDate,
    pub name: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandleRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl CandleRow {
    pub fn direction(&self) -> CandleDirection {
        if self.open <= self.close {
            CandleDirection::Up
        } else {
            CandleDirection::Down
        }
    }
}

/// Un-pivots the selected matrix rows into (date, name, price) rows, grouped
/// by company in selection order and by date within each company.
pub fn to_long_form(
    matrix: &CloseMatrix,
    selected: &[String],
) -> Result<Vec<LongFormRow>, DashboardError> {
    if selected.is_empty() {
        return Err(DashboardError::NoSelection);
    }

    let subset = matrix.select(selected)?;
    let rows = subset
        .rows()
        .iter()
        .flat_map(|row| {
            subset
                .dates()
                .iter()
                .zip(&row.values)
                .map(|(date, price)| LongFormRow {
                    date: *date,
                    name: row.name.clone(),
                    price: *price,
                })
        })
        .collect();
    Ok(rows)
}

/// Rebuilds a close matrix from long-form rows. Companies keep their first
/// appearance order; dates come out ascending.
pub fn pivot_long_form(rows: &[LongFormRow]) -> CloseMatrix {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    dates.sort();
    dates.dedup();

    let mut matrix_rows: Vec<MatrixRow> = Vec::new();
    for row in rows {
        let idx = match matrix_rows.iter().position(|m| m.name == row.name) {
            Some(idx) => idx,
            None => {
                matrix_rows.push(MatrixRow {
                    name: row.name.clone(),
                    values: vec![None; dates.len()],
                });
                matrix_rows.len() - 1
            }
        };
        if let Ok(slot) = dates.binary_search(&row.date) {
            matrix_rows[idx].values[slot] = row.price;
        }
    }

    CloseMatrix::new(dates, matrix_rows)
}

/// Projects the table onto one ticker as date-ordered candles. Days without a
/// complete bar are left out; no candles at all is an `EmptyResult`.
pub fn to_single_instrument_ohlc(
    table: &OhlcTable,
    symbol: &str,
) -> Result<Vec<CandleRow>, DashboardError> {
    let series = table.series(symbol).ok_or_else(|| {
        DashboardError::PreconditionViolation(format!("{symbol} is not part of the fetched data"))
    })?;

    let candles: Vec<CandleRow> = table
        .dates()
        .iter()
        .enumerate()
        .filter_map(|(idx, date)| {
            Some(CandleRow {
                date: *date,
                open: series.open[idx]?,
                high: series.high[idx]?,
                low: series.low[idx]?,
                close: series.close[idx]?,
            })
        })
        .collect();

    if candles.is_empty() {
        return Err(DashboardError::EmptyResult(format!(
            "{symbol} has no trading data in this window"
        )));
    }
    Ok(candles)
}
