use serde::{Deserialize, Serialize};

use crate::models::request_params::{BarsRequestParams, ProviderParams};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Raw,
    Split,
    Dividend,
    #[default]
    All,
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Sip,
    #[default]
    Iex,
    Otc,
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Adjustment {
    fn as_str(self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

impl Feed {
    fn as_str(self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Largest page Alpaca serves.
const MAX_PAGE_LIMIT: u32 = 10_000;

/// Query string for a daily-bar request over `[start, end)`, sorted ascending.
pub(crate) fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    let specific = match &params.provider_specific {
        ProviderParams::Alpaca(p) => p.clone(),
        ProviderParams::None => AlpacaBarsParams::default(),
    };

    vec![
        ("symbols".to_string(), params.symbol.clone()),
        ("timeframe".to_string(), "1Day".to_string()),
        ("start".to_string(), params.start.format("%Y-%m-%d").to_string()),
        ("end".to_string(), params.end.format("%Y-%m-%d").to_string()),
        (
            "adjustment".to_string(),
            specific.adjustment.unwrap_or_default().as_str().to_string(),
        ),
        (
            "feed".to_string(),
            specific.feed.unwrap_or_default().as_str().to_string(),
        ),
        (
            "limit".to_string(),
            specific.limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT).to_string(),
        ),
        ("sort".to_string(), "asc".to_string()),
    ]
}
