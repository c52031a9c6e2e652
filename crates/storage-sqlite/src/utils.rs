//! Small conversion helpers shared by the repositories.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::error;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Current time as the naive UTC timestamp the columns store.
pub fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive.and_utc()
}

pub fn to_naive(utc: DateTime<Utc>) -> NaiveDateTime {
    utc.naive_utc()
}

/// Decimal column encoding: plain decimal strings, 2 dp for money.
pub fn dec_to_text(value: Decimal) -> String {
    value.to_string()
}

/// Parses a stored decimal string. Ledger columns are only ever written
/// from `Decimal`, so a parse failure means column corruption; log it
/// and fall back to zero rather than poisoning every read.
pub fn text_to_dec(value: &str, field: &str) -> Decimal {
    match Decimal::from_str(value) {
        Ok(d) => d,
        Err(e) => {
            error!("failed to parse {field} '{value}' as decimal: {e}");
            Decimal::ZERO
        }
    }
}

pub fn opt_text_to_dec(value: Option<&str>, field: &str) -> Option<Decimal> {
    value.map(|v| text_to_dec(v, field))
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
