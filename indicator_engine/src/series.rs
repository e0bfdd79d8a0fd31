use chrono::NaiveDate;
use market_data_ingestor::models::bar::Bar;

use crate::errors::{SeriesDefect, SeriesError};

/// The slice of a daily bar the indicators need.
///
/// Kept as a trait so the engine does not care which bar type a caller stores.
pub trait PricePoint {
    fn date(&self) -> NaiveDate;
    fn close(&self) -> f64;
}

impl PricePoint for Bar {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn close(&self) -> f64 {
        self.close
    }
}

/// Checks that dates are strictly increasing and every close is finite.
///
/// Gaps between dates (weekends, holidays) are fine.
pub fn validate_series<B: PricePoint>(symbol: &str, series: &[B]) -> Result<(), SeriesError> {
    let invalid = |index: usize, date: NaiveDate, defect: SeriesDefect| SeriesError::InvalidSeries {
        symbol: symbol.to_string(),
        index,
        date,
        defect,
    };

    let mut previous: Option<NaiveDate> = None;
    for (index, point) in series.iter().enumerate() {
        let date = point.date();
        if !point.close().is_finite() {
            return Err(invalid(index, date, SeriesDefect::NonFiniteClose));
        }
        if let Some(prev) = previous {
            if date == prev {
                return Err(invalid(index, date, SeriesDefect::DuplicateDate));
            }
            if date < prev {
                return Err(invalid(index, date, SeriesDefect::OutOfOrder));
            }
        }
        previous = Some(date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point(NaiveDate, f64);

    impl PricePoint for Point {
        fn date(&self) -> NaiveDate {
            self.0
        }
        fn close(&self) -> f64 {
            self.1
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn accepts_gaps() {
        let series = [Point(day(1), 1.0), Point(day(2), 1.0), Point(day(6), 1.0)];
        assert!(validate_series("GAP", &series).is_ok());
    }

    #[test]
    fn rejects_duplicates_and_unsorted_input() {
        let dup = [Point(day(1), 1.0), Point(day(1), 2.0)];
        assert_eq!(
            validate_series("DUP", &dup),
            Err(SeriesError::InvalidSeries {
                symbol: "DUP".into(),
                index: 1,
                date: day(1),
                defect: SeriesDefect::DuplicateDate,
            })
        );

        let unsorted = [Point(day(3), 1.0), Point(day(2), 2.0)];
        let err = validate_series("UNS", &unsorted).unwrap_err();
        assert!(err.to_string().contains("date out of order"));
    }

    #[test]
    fn rejects_nan_close() {
        let series = [Point(day(1), 1.0), Point(day(2), f64::NAN)];
        assert!(matches!(
            validate_series("NAN", &series),
            Err(SeriesError::InvalidSeries { defect: SeriesDefect::NonFiniteClose, index: 1, .. })
        ));
    }
}
