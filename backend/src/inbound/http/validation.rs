//! Shared parsing and validation helpers for inbound HTTP adapters.
//!
//! Every failure is an `invalid_request` error whose `details` carry the
//! offending wire field, a machine-readable code and, where useful, the
//! rejected value.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidField,
    InvalidUuid,
    InvalidDate,
    InvalidTime,
    InvalidTimestamp,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidField => "invalid_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidTime => "invalid_time",
            Self::InvalidTimestamp => "invalid_timestamp",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn with_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Field-tagged error for a domain validation failure.
pub(crate) fn invalid_field_error(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": ErrorCode::InvalidField.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        with_value(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

pub(crate) fn parse_optional_uuid(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    value.map(|raw| parse_uuid(raw, field)).transpose()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        with_value(
            field,
            ErrorCode::InvalidDate,
            format!("{} must be a YYYY-MM-DD date", field.as_str()),
            value,
        )
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

/// Parse an `HH:MM` or `HH:MM:SS` time of day.
pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            with_value(
                field,
                ErrorCode::InvalidTime,
                format!("{} must be HH:MM or HH:MM:SS", field.as_str()),
                value,
            )
        })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            with_value(
                field,
                ErrorCode::InvalidTimestamp,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    const START: FieldName = FieldName::new("startTime");

    #[rstest]
    #[case("09:00", (9, 0, 0))]
    #[case("17:45:30", (17, 45, 30))]
    fn times_accept_both_precisions(#[case] raw: &str, #[case] hms: (u32, u32, u32)) {
        let expected = NaiveTime::from_hms_opt(hms.0, hms.1, hms.2).expect("time");
        assert_eq!(parse_time(raw, START), Ok(expected));
    }

    #[rstest]
    #[case("9am")]
    #[case("25:00")]
    #[case("")]
    fn bad_times_name_the_field(#[case] raw: &str) {
        let error = parse_time(raw, START).expect_err("invalid time");
        assert_eq!(error.code(), DomainCode::InvalidRequest);
        let details = error.details().expect("details");
        assert_eq!(details["field"], "startTime");
        assert_eq!(details["code"], "invalid_time");
        assert_eq!(details["value"], raw);
    }

    #[rstest]
    fn dates_are_iso_calendar_dates() {
        let field = FieldName::new("start");
        assert_eq!(
            parse_date("2024-03-11", field),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 11).expect("date"))
        );
        assert!(parse_date("11/03/2024", field).is_err());
        assert_eq!(parse_optional_date(None, field), Ok(None));
    }

    #[rstest]
    fn timestamps_normalise_to_utc() {
        let parsed = parse_rfc3339_timestamp("2024-03-11T10:00:00+05:30", FieldName::new("dueDate"))
            .expect("timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-03-11T04:30:00+00:00");
    }

    #[rstest]
    fn uuids_report_the_rejected_value() {
        let error = parse_uuid("nope", FieldName::new("subjectId")).expect_err("invalid");
        let details = error.details().expect("details");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "nope");
    }
}
