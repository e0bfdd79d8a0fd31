use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// What made a series unusable for indicator computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesDefect {
    DuplicateDate,
    OutOfOrder,
    NonFiniteClose,
}

impl fmt::Display for SeriesDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeriesDefect::DuplicateDate => "duplicate date",
            SeriesDefect::OutOfOrder => "date out of order",
            SeriesDefect::NonFiniteClose => "non-finite close",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    /// The input failed validation; no indicator was computed.
    #[error("invalid series for {symbol}: {defect} at index {index} ({date})")]
    InvalidSeries {
        symbol: String,
        index: usize,
        date: NaiveDate,
        defect: SeriesDefect,
    },
}
