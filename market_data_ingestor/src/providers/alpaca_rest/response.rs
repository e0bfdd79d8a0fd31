use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{models::bar::Bar, providers::yahoo_chart::response::FALLBACK_TIMEZONE};

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    // `null` when the symbol has no bars in range.
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

impl AlpacaBar {
    /// Daily bars are stamped at midnight New York time; the adjusted close is
    /// the close itself because requests ask for adjusted prices.
    pub fn into_bar(self) -> Bar {
        Bar {
            date: self.timestamp.with_timezone(&FALLBACK_TIMEZONE).date_naive(),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            adj_close: self.close,
            volume: self.volume.round() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn daily_timestamps_map_to_new_york_dates() {
        let body = r#"{
          "bars": {"MSFT": [
            {"t": "2025-01-02T05:00:00Z", "o": 425.53, "h": 426.07, "l": 414.85, "c": 418.58, "v": 16896469, "n": 1, "vw": 1.0}
          ]},
          "next_page_token": null
        }"#;
        let resp: AlpacaResponse = serde_json::from_str(body).unwrap();
        let mut bars = resp.bars.unwrap();
        let bar = bars.swap_remove("MSFT").unwrap().pop().unwrap().into_bar();

        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(bar.adj_close, bar.close);
        assert_eq!(bar.volume, 16_896_469);
    }

    #[test]
    fn null_bars_are_accepted() {
        let resp: AlpacaResponse =
            serde_json::from_str(r#"{"bars": null, "next_page_token": null}"#).unwrap();
        assert!(resp.bars.is_none());
    }
}
