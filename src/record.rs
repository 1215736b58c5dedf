use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A flat, uniquely identified record stored in one slot.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Timestamp-derived record id (milliseconds since the epoch, rendered in
/// decimal).
///
/// Two calls in the same millisecond still get distinct ids: the generator
/// never hands out a value less than or equal to the previous one.
pub fn new_record_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = if now > prev { now } else { prev + 1 };
        match LAST_ID.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses the `YYYY-MM-DD` text a date field is typed as.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// `dd/mm/yyyy`, the way dates are shown in lists.
pub fn display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => "-".to_string(),
    }
}

/// Decodes a stored date field. `null`, `""` and text that is not
/// `YYYY-MM-DD` all read as `None`, so one cleared date input cannot make the
/// whole slot undecodable.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}
