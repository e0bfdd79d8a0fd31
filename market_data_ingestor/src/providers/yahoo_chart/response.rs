use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::models::bar::Bar;

/// Exchange calendar assumed when the payload does not name one.
pub const FALLBACK_TIMEZONE: Tz = chrono_tz::America::New_York;

#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    // Absent when the range holds no trading days.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub exchange_timezone_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<i64>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// Exchange timezone from the payload, or [`FALLBACK_TIMEZONE`].
    pub fn timezone(&self) -> Tz {
        self.meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(FALLBACK_TIMEZONE)
    }

    /// Flattens the column-oriented payload into bars.
    ///
    /// Rows with a missing open/high/low/close/volume are dropped (Yahoo emits
    /// them for halted sessions). A missing adjusted close falls back to the
    /// close. Order is left as delivered.
    pub fn into_bars(self) -> Vec<Bar> {
        let tz = self.timezone();
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let adj = self
            .indicators
            .adjclose
            .into_iter()
            .next()
            .unwrap_or_default();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = local_date(ts, tz)?;
                let open = quote.open.get(i).copied().flatten()?;
                let high = quote.high.get(i).copied().flatten()?;
                let low = quote.low.get(i).copied().flatten()?;
                let close = quote.close.get(i).copied().flatten()?;
                let volume = quote.volume.get(i).copied().flatten()?;
                let adj_close = adj.adjclose.get(i).copied().flatten().unwrap_or(close);
                Some(Bar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    adj_close,
                    volume,
                })
            })
            .collect()
    }
}

fn local_date(epoch_secs: i64, tz: Tz) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0).map(|utc| utc.with_timezone(&tz).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DAYS: &str = r#"{
      "chart": {
        "result": [{
          "meta": {"symbol": "AAPL", "exchangeTimezoneName": "America/New_York"},
          "timestamp": [1717421400, 1717507800, 1717594200],
          "indicators": {
            "quote": [{
              "open":   [192.9, 194.64, null],
              "high":   [194.99, 195.32, 196.5],
              "low":    [192.52, 193.03, 194.17],
              "close":  [194.03, 194.35, 195.87],
              "volume": [50080500, 47471400, 54156800]
            }],
            "adjclose": [{"adjclose": [193.12, 193.44, 194.95]}]
          }
        }],
        "error": null
      }
    }"#;

    #[test]
    fn parses_columns_into_local_dates() {
        let resp: ChartResponse = serde_json::from_str(TWO_DAYS).unwrap();
        let result = resp.chart.result.unwrap().into_iter().next().unwrap();
        let bars = result.into_bars();

        // third row has a null open and is dropped
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(bars[0].close, 194.03);
        assert_eq!(bars[0].adj_close, 193.12);
        assert_eq!(bars[1].volume, 47_471_400);
    }

    #[test]
    fn missing_timestamps_mean_no_bars() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let result = resp.chart.result.unwrap().into_iter().next().unwrap();
        assert_eq!(result.timezone(), FALLBACK_TIMEZONE);
        assert!(result.into_bars().is_empty());
    }

    #[test]
    fn error_payload_deserializes() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(resp.chart.result.is_none());
        assert_eq!(resp.chart.error.unwrap().code, "Not Found");
    }
}
