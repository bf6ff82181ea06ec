//! Yahoo Finance data provider.
//!
//! Fetches daily closes from Yahoo's v8 chart API and dividend yields from the
//! v10 quote-summary API. One request per call; failures are returned to the
//! caller, which degrades them to an empty series.
//!
//! Quote-summary requests need a session cookie plus a matching crumb. The
//! client keeps a cookie store; the crumb is fetched on first use and
//! dropped again when Yahoo answers 401.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::period::TrailingPeriod;
use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider};
use crate::domain::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Any page on this host sets the session cookie the crumb is bound to.
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance v10 quote-summary response (summaryDetail module only).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteSummaryData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    summary_detail: Option<SummaryDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    dividend_yield: Option<RawValue>,
    trailing_annual_dividend_yield: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .cookie_store(true)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            crumb: Mutex::new(None),
        })
    }

    /// The session crumb, fetched once per provider.
    fn crumb(&self) -> Result<String, DataError> {
        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        // The cookie page answers 404 but still sets the cookie.
        self.client
            .get(COOKIE_URL)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(format!("session cookie: {e}")))?;

        let resp = self
            .client
            .get(CRUMB_URL)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(format!("crumb: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::AuthenticationRequired(format!(
                "crumb request returned HTTP {status}"
            )));
        }
        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(format!("crumb: {e}")))?;
        let crumb = Self::parse_crumb(&body)?;
        debug!("yahoo session crumb acquired");

        if let Ok(mut slot) = self.crumb.lock() {
            *slot = Some(crumb.clone());
        }
        Ok(crumb)
    }

    fn cached_crumb(&self) -> Option<String> {
        self.crumb.lock().ok().and_then(|slot| slot.clone())
    }

    fn forget_crumb(&self) {
        if let Ok(mut slot) = self.crumb.lock() {
            *slot = None;
        }
    }

    /// A crumb is a short opaque token; anything else is an error page.
    fn parse_crumb(body: &str) -> Result<String, DataError> {
        let crumb = body.trim();
        if crumb.is_empty() || crumb.len() > 64 || crumb.contains(char::is_whitespace) {
            return Err(DataError::AuthenticationRequired(
                "Yahoo Finance returned no usable crumb".into(),
            ));
        }
        Ok(crumb.to_string())
    }

    /// Build the chart API URL for a symbol and date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(start_ts);
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true"
        )
    }

    fn quote_summary_url(symbol: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{symbol}\
             ?modules=summaryDetail"
        )
    }

    /// Parse the chart API response into daily closes.
    ///
    /// Dates are taken in the exchange's local time (`gmtoffset`) so that a
    /// Stockholm session and a Chicago session on the same day share a date.
    /// The adjusted close is preferred; the raw close is the fallback.
    fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<PricePoint>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A valid symbol with no trades in the window has no timestamps.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());
            let close = quote.close.get(i).copied().flatten();

            // Holidays and half-filled rows carry no close at all.
            if let Some(close) = adj_close.or(close) {
                points.push(PricePoint { date, close });
            }
        }

        Ok(points)
    }

    /// Parse the quote-summary response into a yield percentage.
    fn parse_dividend_yield(resp: QuoteSummaryResponse) -> Result<Option<f64>, DataError> {
        if let Some(err) = resp.quote_summary.error {
            return Err(DataError::ResponseFormatChanged(format!(
                "{}: {}",
                err.code, err.description
            )));
        }

        let detail = resp
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .and_then(|d| d.summary_detail);

        let fraction = detail.and_then(|d| {
            d.dividend_yield
                .and_then(|v| v.raw)
                .or_else(|| d.trailing_annual_dividend_yield.and_then(|v| v.raw))
        });

        Ok(fraction.map(|f| f * 100.0))
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        symbol: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DataError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(format!("{symbol}: {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DataError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
        }

        resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, period: TrailingPeriod) -> Result<FetchResult, DataError> {
        let end = chrono::Local::now().date_naive();
        let start = period.start_from(end);
        debug!(symbol, %start, %end, "requesting chart");

        let chart: ChartResponse =
            self.get_json(symbol, &Self::chart_url(symbol, start, end), &[])?;
        let points = Self::parse_chart(symbol, chart)?;

        Ok(FetchResult {
            symbol: symbol.to_string(),
            series: PriceSeries::new(symbol, points),
            source: DataSource::YahooFinance,
        })
    }

    fn dividend_yield(&self, symbol: &str) -> Result<Option<f64>, DataError> {
        let crumb = self.crumb()?;
        let summary: QuoteSummaryResponse = self
            .get_json(symbol, &Self::quote_summary_url(symbol), &[("crumb", crumb.as_str())])
            .map_err(|e| {
                if matches!(e, DataError::AuthenticationRequired(_)) {
                    warn!(symbol, "yahoo rejected the session crumb");
                    self.forget_crumb();
                }
                e
            })?;
        Self::parse_dividend_yield(summary)
    }
}
