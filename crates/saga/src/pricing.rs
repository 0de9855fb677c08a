//! Stay dates and price computation.

use chrono::NaiveDate;

use crate::error::SagaError;

/// A validated stay: `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayDates {
    start: NaiveDate,
    end: NaiveDate,
}

impl StayDates {
    /// Validates a pair of dates; a zero-night stay is allowed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SagaError> {
        if end < start {
            return Err(SagaError::Validation(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses and validates `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self, SagaError> {
        let start = parse_date("startDate", start)?;
        let end = parse_date("endDate", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of whole nights between start and end.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, SagaError> {
    NaiveDate::parse_from_str(value, common::date::DATE_FORMAT)
        .map_err(|e| SagaError::Validation(format!("invalid {field} '{value}': {e}")))
}

/// Price of a stay after the loyalty discount, floored to the smallest unit.
pub fn booking_price(nights: i64, nightly_price: i64, discount: u8) -> i64 {
    nights * nightly_price * (100 - i64::from(discount)) / 100
}
