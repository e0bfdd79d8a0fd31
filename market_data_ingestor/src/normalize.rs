//! Turns whatever a provider delivered into a clean ascending series.

use crate::models::bar::Bar;

/// Normalizes raw provider bars.
///
/// - drops malformed rows (non-finite prices, negative volume)
/// - rounds prices to four fractional digits
/// - sorts ascending by date
/// - collapses duplicate dates, keeping the last occurrence
pub fn normalize_bars(raw: Vec<Bar>) -> Vec<Bar> {
    let mut bars: Vec<Bar> = raw
        .into_iter()
        .filter(Bar::is_well_formed)
        .map(Bar::rounded)
        .collect();

    // stable: duplicates keep their delivery order
    bars.sort_by_key(|b| b.date);

    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume: 1_000,
        }
    }

    #[test]
    fn output_is_strictly_increasing() {
        let raw = vec![bar(5, 10.0), bar(1, 11.0), bar(3, 12.0), bar(3, 12.5), bar(4, f64::NAN)];
        let bars = normalize_bars(raw);

        let dates: Vec<u32> = bars.iter().map(|b| chrono::Datelike::day(&b.date)).collect();
        assert_eq!(dates, vec![1, 3, 5]);
        // last duplicate wins
        assert_eq!(bars[1].close, 12.5);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(normalize_bars(vec![]).is_empty());
    }
}
