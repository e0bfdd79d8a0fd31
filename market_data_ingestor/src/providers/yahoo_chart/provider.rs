use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, ProviderError, ProviderInitError, ReqwestSnafu,
        ValidationSnafu,
        yahoo_chart::response::ChartResponse,
    },
};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) market_data_ingestor";

pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// Creates a provider against the public Yahoo Finance endpoint.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_base_url(BASE_URL)
    }

    /// Creates a provider against another chart-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderInitError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context(ClientBuildSnafu)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

fn epoch_midnight(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Query string for a daily-bar request over `[start, end)`.
pub(crate) fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    vec![
        ("period1".to_string(), epoch_midnight(params.start).to_string()),
        ("period2".to_string(), epoch_midnight(params.end).to_string()),
        ("interval".to_string(), "1d".to_string()),
        ("events".to_string(), "div,splits".to_string()),
        ("includeAdjustedClose".to_string(), "true".to_string()),
    ]
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        if let Err(message) = params.validate() {
            return ValidationSnafu { message }.fail();
        }

        let url = format!("{}/{}", self.base_url, params.symbol);
        debug!(%url, start = %params.start, end = %params.end, "requesting yahoo chart");

        let response = self
            .client
            .get(&url)
            .query(&construct_params(&params))
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            // Yahoo wraps most failures in the chart error envelope.
            let message = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|r| r.chart.error)
                .map(|e| format!("{}: {}", e.code, e.description))
                .unwrap_or(body);
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let chart = response
            .json::<ChartResponse>()
            .await
            .context(ReqwestSnafu)?
            .chart;

        if let Some(err) = chart.error {
            return ApiSnafu {
                status: status.as_u16(),
                message: format!("{}: {}", err.code, err.description),
            }
            .fail();
        }

        let bars = chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|result| result.into_bars())
            .unwrap_or_default();

        Ok(BarSeries::new(params.symbol, bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_utc_midnights() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let params = BarsRequestParams::trailing("AAPL", 2, today);
        let query = construct_params(&params);

        assert_eq!(query[0], ("period1".to_string(), "1717372800".to_string()));
        assert_eq!(query[1], ("period2".to_string(), "1717632000".to_string()));
        assert!(query.contains(&("interval".to_string(), "1d".to_string())));
    }

    #[tokio::test]
    async fn invalid_params_fail_before_any_request() {
        let provider = YahooChartProvider::with_base_url("http://127.0.0.1:9").unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let mut params = BarsRequestParams::trailing("AAPL", 2, today);
        params.end = params.start;

        let err = provider.fetch_bars(params).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }
}
