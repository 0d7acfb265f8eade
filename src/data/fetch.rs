use crate::data::table::{DownloadFrame, Field, FrameColumn};
use crate::error::{DashboardError, ProviderError};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use futures_util::future::try_join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Source of daily OHLC bars. One call covers every requested symbol.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Daily bars for `symbols` between `start` and `end`, both inclusive.
    async fn download(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DownloadFrame, ProviderError>;
}

/// Calendar window ending today and spanning `day_count` days, today included.
pub fn fetch_window(day_count: u32, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), DashboardError> {
    if day_count == 0 {
        return Err(DashboardError::PreconditionViolation(
            "day count must be at least 1".to_string(),
        ));
    }
    let start = today
        .checked_sub_days(Days::new(u64::from(day_count - 1)))
        .ok_or_else(|| {
            DashboardError::PreconditionViolation(format!("day count {day_count} out of range"))
        })?;
    Ok((start, today))
}

pub struct YahooProvider {
    http: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyBars, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = midnight_utc(start).to_string();
        let period2 = end
            .succ_opt()
            .map(midnight_utc)
            .unwrap_or_else(|| midnight_utc(end))
            .to_string();

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        decode_chart(symbol, status, &body)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn download(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DownloadFrame, ProviderError> {
        let bars = try_join_all(symbols.iter().map(|s| self.fetch_chart(s, start, end))).await?;
        Ok(assemble_frame(bars))
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Bar {
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
}

impl Bar {
    fn field(&self, field: Field) -> Option<f64> {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DailyBars {
    symbol: String,
    bars: BTreeMap<NaiveDate, Bar>,
}

/// Yahoo answers a bad symbol with a 404 carrying a JSON `chart.error`;
/// rate limits and proxy failures come back as plain text.
fn decode_chart(symbol: &str, status: StatusCode, body: &str) -> Result<DailyBars, ProviderError> {
    if !status.is_success() {
        return match serde_json::from_str::<ChartEnvelope>(body) {
            Ok(envelope) if envelope.chart.error.is_some() => parse_chart(symbol, envelope),
            _ => Err(ProviderError::Api(format!("{symbol}: HTTP {status}"))),
        };
    }

    let envelope = serde_json::from_str::<ChartEnvelope>(body)
        .map_err(|err| ProviderError::Parse(format!("{symbol}: {err}")))?;
    parse_chart(symbol, envelope)
}

fn parse_chart(symbol: &str, envelope: ChartEnvelope) -> Result<DailyBars, ProviderError> {
    if let Some(err) = envelope.chart.error {
        return Err(ProviderError::Api(format!(
            "{symbol}: {} ({})",
            err.description, err.code
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::Parse(format!("{symbol}: chart result missing")))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars = BTreeMap::new();
    for (idx, ts) in result.timestamp.iter().enumerate() {
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| ProviderError::Parse(format!("{symbol}: invalid timestamp {ts}")))?
            .date_naive();
        let at = |values: &Vec<Option<f64>>| values.get(idx).copied().flatten();
        bars.insert(
            date,
            Bar {
                open: at(&quote.open),
                high: at(&quote.high),
                low: at(&quote.low),
                close: at(&quote.close),
            },
        );
    }

    Ok(DailyBars {
        symbol: symbol.to_string(),
        bars,
    })
}

fn assemble_frame(all: Vec<DailyBars>) -> DownloadFrame {
    let dates: Vec<NaiveDate> = all
        .iter()
        .flat_map(|d| d.bars.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut columns = Vec::with_capacity(all.len() * 4);
    for daily in &all {
        for field in Field::all() {
            let values = dates
                .iter()
                .map(|date| daily.bars.get(date).and_then(|bar| bar.field(field)))
                .collect();
            columns.push(FrameColumn {
                field,
                symbol: Some(daily.symbol.clone()),
                values,
            });
        }
    }

    DownloadFrame { dates, columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ChartEnvelope {
        serde_json::from_str(json).unwrap()
    }

    /// Serves one canned HTTP response on a local port and returns its base URL.
    async fn serve_once(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    #[test]
    fn window_includes_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(fetch_window(1, today).unwrap(), (today, today));
        let (start, end) = fetch_window(30, today).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(end, today);
    }

    #[test]
    fn zero_day_window_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert!(matches!(
            fetch_window(0, today),
            Err(DashboardError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn parses_daily_chart_with_gaps() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "gmtoffset": -14400 },
                    "timestamp": [1709731800, 1709818200],
                    "indicators": {
                        "quote": [{
                            "open": [169.15, null],
                            "high": [170.73, null],
                            "low": [168.49, null],
                            "close": [169.12, 169.00],
                            "volume": [53423100, 46406400]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let daily = parse_chart("AAPL", envelope(json)).unwrap();
        let dates: Vec<NaiveDate> = daily.bars.keys().copied().collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            ]
        );
        let second = &daily.bars[&dates[1]];
        assert_eq!(second.open, None);
        assert_eq!(second.close, Some(169.00));
    }

    #[test]
    fn api_error_is_reported() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;
        let err = parse_chart("XXXX", envelope(json)).unwrap_err();
        assert!(matches!(err, ProviderError::Api(msg) if msg.contains("delisted")));
    }

    #[test]
    fn missing_timestamps_give_no_bars() {
        let json = r#"{
            "chart": {
                "result": [{ "meta": {}, "indicators": { "quote": [{}] } }],
                "error": null
            }
        }"#;
        let daily = parse_chart("AAPL", envelope(json)).unwrap();
        assert!(daily.bars.is_empty());
        assert!(assemble_frame(vec![daily]).is_empty());
    }

    #[test]
    fn frame_aligns_symbols_on_the_union_of_dates() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let bar = |close: f64| Bar {
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
        };
        let aapl = DailyBars {
            symbol: "AAPL".into(),
            bars: BTreeMap::from([(d1, bar(1.0)), (d2, bar(2.0))]),
        };
        let meta = DailyBars {
            symbol: "META".into(),
            bars: BTreeMap::from([(d2, bar(5.0))]),
        };

        let frame = assemble_frame(vec![aapl, meta]);
        assert_eq!(frame.dates, vec![d1, d2]);
        assert_eq!(frame.columns.len(), 8);
        let meta_close = frame
            .columns
            .iter()
            .find(|c| c.field == Field::Close && c.symbol.as_deref() == Some("META"))
            .unwrap();
        assert_eq!(meta_close.values, vec![None, Some(5.0)]);
    }

    #[test]
    fn plain_text_error_status_keeps_the_status() {
        let err = decode_chart("AAPL", StatusCode::SERVICE_UNAVAILABLE, "<html>bad gateway</html>")
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api(msg) if msg.contains("503") && msg.contains("AAPL")));
    }

    #[test]
    fn json_error_body_on_404_is_kept() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = decode_chart("XXXX", StatusCode::NOT_FOUND, body).unwrap_err();
        assert!(matches!(err, ProviderError::Api(msg) if msg.contains("delisted")));
    }

    #[test]
    fn malformed_success_body_is_a_parse_error() {
        let err = decode_chart("AAPL", StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(msg) if msg.starts_with("AAPL")));
    }

    #[tokio::test]
    async fn rate_limited_download_reports_the_status() {
        let base_url = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\nContent-Type: text/plain\r\nContent-Length: 17\r\nConnection: close\r\n\r\nToo Many Requests",
        )
        .await;
        let provider = YahooProvider::new(base_url).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let err = provider
            .download(&["AAPL".to_string()], day, day)
            .await
            .unwrap_err();
        let message = DashboardError::from(err).to_string();
        assert!(message.contains("429"), "{message}");
        assert!(message.starts_with("failed to fetch price data"));
    }
}
