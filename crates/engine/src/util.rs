//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::NaiveDate;
use chrono_tz::Tz;
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine, money::MAX_AMOUNT_MINOR};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value).map_err(Into::into)
}

/// Money accepted from clients must be within `0..=MAX_AMOUNT_MINOR`.
pub(crate) fn validate_money(field: &str, value: Option<i64>) -> ResultEngine<Option<i64>> {
    if let Some(amount) = value
        && !(0..=MAX_AMOUNT_MINOR).contains(&amount)
    {
        return Err(EngineError::invalid(
            field,
            format!("must be between 0 and {MAX_AMOUNT_MINOR}"),
        ));
    }
    Ok(value)
}

pub(crate) fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::invalid(
            "end_date",
            "end date must not be before start date",
        ));
    }
    Ok(())
}

/// Longest stay a single stop may cover.
pub(crate) const MAX_STOP_DAYS: i64 = 366;

/// Stop dates are ordered and span at most [`MAX_STOP_DAYS`] days.
pub(crate) fn validate_stop_dates(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    validate_date_range(start, end)?;
    if duration_days(start, end) > MAX_STOP_DAYS {
        return Err(EngineError::invalid(
            "end_date",
            format!("a stop cannot last more than {MAX_STOP_DAYS} days"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_priority(value: u8) -> ResultEngine<u8> {
    if !(api_types::activity::PRIORITY_MIN..=api_types::activity::PRIORITY_MAX).contains(&value) {
        return Err(EngineError::invalid("priority", "must be between 1 and 4"));
    }
    Ok(value)
}

pub(crate) fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> ResultEngine<()> {
    if let Some(lat) = latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        return Err(EngineError::invalid("latitude", "must be between -90 and 90"));
    }
    if let Some(lon) = longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        return Err(EngineError::invalid(
            "longitude",
            "must be between -180 and 180",
        ));
    }
    Ok(())
}

/// Empty timezones are dropped; anything else must be an IANA name.
pub(crate) fn normalize_timezone(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(tz) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    tz.parse::<Tz>()
        .map_err(|_| EngineError::invalid("timezone", format!("unknown timezone '{tz}'")))?;
    Ok(Some(tz.to_string()))
}

/// Inclusive day count of a date range.
pub(crate) fn duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(EngineError::invalid("email", "invalid email address"));
    }
    Ok(email)
}
