//! Festival events and their admin form input.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::EventId;
use super::classifier::festival_offset;
use crate::error::FieldErrors;

/// Ticket price in rupees. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// A free event.
    pub const FREE: Self = Self(0.0);

    /// Wraps a numeric price.
    ///
    /// # Errors
    ///
    /// Returns a message when `value` is negative, NaN or infinite.
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            return Err("Price must be a valid number".to_string());
        }
        if value < 0.0 {
            return Err("Price cannot be negative".to_string());
        }
        Ok(Self(value))
    }

    /// Parses form input such as `"499"` or `" 99.50 "`.
    ///
    /// # Errors
    ///
    /// Returns a message when the text is not a non-negative number.
    pub fn parse(text: &str) -> Result<Self, String> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| "Price must be a valid number".to_string())?;
        Self::new(value)
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// `true` when the event costs nothing.
    #[must_use]
    pub fn is_free(self) -> bool {
        self.0 == 0.0
    }

    /// Display label: `Free` or `₹499` / `₹99.50`.
    #[must_use]
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_free() {
            f.write_str("Free")
        } else if self.0.fract() == 0.0 {
            write!(f, "₹{:.0}", self.0)
        } else {
            write!(f, "₹{:.2}", self.0)
        }
    }
}

impl TryFrom<f64> for Price {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// A scheduled festival event as stored in the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Primary key.
    pub id: EventId,
    /// Event title; also drives category classification.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start time. Orders listings and picks the day bucket.
    pub date: DateTime<Utc>,
    /// Venue.
    #[serde(default)]
    pub location: Option<String>,
    /// Public URL of the event image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Ticket price.
    pub price: Price,
    /// Row creation time, stamped by the store.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Raw admin form input for creating an event.
///
/// `price` stays text until [`EventInput::validate`] so that a bad value
/// is rejected before any upload or store call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventInput {
    /// Event title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Either an RFC 3339 timestamp or a `YYYY-MM-DD` calendar date.
    pub date: String,
    /// Optional `HH:MM` local festival time, combined with a calendar `date`.
    #[serde(default)]
    pub time: Option<String>,
    /// Venue.
    #[serde(default)]
    pub location: Option<String>,
    /// Existing image URL, used when no file is uploaded.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Price as typed in the form.
    #[serde(default)]
    pub price: Option<String>,
}

/// A validated event ready to be written (minus id and timestamps).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    /// Event title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Start time.
    pub date: DateTime<Utc>,
    /// Venue.
    pub location: Option<String>,
    /// Public image URL.
    pub image_url: Option<String>,
    /// Ticket price.
    pub price: Price,
}

impl EventInput {
    /// Checks every field and returns the typed event.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages for each invalid field.
    pub fn validate(self) -> Result<NewEvent, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.add("title", "Title is required");
        }

        let date = parse_event_datetime(&self.date, self.time.as_deref())
            .map_err(|msg| errors.add("date", msg))
            .ok();

        let price = match self.price.as_deref() {
            None => Ok(Price::FREE),
            Some(text) if text.trim().is_empty() => Ok(Price::FREE),
            Some(text) => Price::parse(text),
        }
        .map_err(|msg| errors.add("price", msg))
        .ok();

        match (errors.into_result(), date, price) {
            (Ok(()), Some(date), Some(price)) => Ok(NewEvent {
                title,
                description: non_blank(self.description),
                date,
                location: non_blank(self.location),
                image_url: non_blank(self.image_url),
                price,
            }),
            (Err(errors), _, _) => Err(errors),
            _ => Err(FieldErrors::single("date", "Date is required")),
        }
    }
}

/// Partial admin update. Absent fields are left untouched; a present but
/// blank optional text field clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New date, same formats as [`EventInput::date`].
    #[serde(default)]
    pub date: Option<String>,
    /// New local time; requires `date`.
    #[serde(default)]
    pub time: Option<String>,
    /// New venue.
    #[serde(default)]
    pub location: Option<String>,
    /// New image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// New price as text.
    #[serde(default)]
    pub price: Option<String>,
}

impl EventPatch {
    /// Validates the present fields and renders them as a store patch row.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for each invalid field.
    pub fn into_row(self) -> Result<serde_json::Map<String, serde_json::Value>, FieldErrors> {
        use serde_json::Value;

        let mut errors = FieldErrors::new();
        let mut row = serde_json::Map::new();

        if let Some(title) = self.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                errors.add("title", "Title is required");
            } else {
                row.insert("title".into(), Value::String(title));
            }
        }
        if let Some(date) = self.date {
            match parse_event_datetime(&date, self.time.as_deref()) {
                Ok(date) => {
                    row.insert("date".into(), serde_json::json!(date));
                }
                Err(msg) => errors.add("date", msg),
            }
        } else if self.time.is_some() {
            errors.add("time", "Time requires a date");
        }
        if let Some(price) = self.price {
            match Price::parse(&price) {
                Ok(price) => {
                    row.insert("price".into(), serde_json::json!(price.get()));
                }
                Err(msg) => errors.add("price", msg),
            }
        }
        for (field, value) in [
            ("description", self.description),
            ("location", self.location),
            ("image_url", self.image_url),
        ] {
            if let Some(value) = value {
                let value = non_blank(Some(value)).map_or(Value::Null, Value::String);
                row.insert(field.into(), value);
            }
        }

        errors.into_result().map(|()| row)
    }
}

/// Parses an event date.
///
/// Accepts a full RFC 3339 timestamp, or a `YYYY-MM-DD` date with an
/// optional `HH:MM` time interpreted in the festival time zone.
///
/// # Errors
///
/// Returns a message when neither form parses.
pub fn parse_event_datetime(date: &str, time: Option<&str>) -> Result<DateTime<Utc>, String> {
    let date = date.trim();
    if date.is_empty() {
        return Err("Date is required".to_string());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| "Date must be YYYY-MM-DD".to_string())?;
    let clock = match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .map_err(|_| "Time must be HH:MM".to_string())?,
        None => NaiveTime::default(),
    };
    festival_offset()
        .from_local_datetime(&day.and_time(clock))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| "Date is out of range".to_string())
}

/// Trims a text field, mapping blank input to `None`.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn input(price: &str) -> EventInput {
        EventInput {
            title: "Quiz".to_string(),
            date: "2025-04-25".to_string(),
            time: Some("12:00".to_string()),
            price: Some(price.to_string()),
            ..EventInput::default()
        }
    }

    #[test]
    fn price_labels() {
        assert_eq!(Price::FREE.label(), "Free");
        let Ok(price) = Price::new(499.0) else {
            panic!("valid price");
        };
        assert_eq!(price.label(), "₹499");
        let Ok(price) = Price::parse("99.5") else {
            panic!("valid price");
        };
        assert_eq!(price.label(), "₹99.50");
    }

    #[test]
    fn price_rejects_negative_and_garbage() {
        assert!(Price::parse("-1").is_err());
        assert!(Price::parse("abc").is_err());
        assert!(Price::parse("NaN").is_err());
        assert!(Price::new(f64::INFINITY).is_err());
    }

    #[test]
    fn price_serializes_as_number() {
        let Ok(price) = Price::new(499.0) else {
            panic!("valid price");
        };
        let Ok(value) = serde_json::to_value(price) else {
            panic!("serialize");
        };
        assert!(value.is_number());
        assert_eq!(value.as_f64(), Some(499.0));
        assert!(serde_json::from_value::<Price>(serde_json::json!(-3.0)).is_err());
    }

    #[test]
    fn validate_combines_date_and_time_in_festival_zone() {
        let Ok(event) = input("499").validate() else {
            panic!("valid input");
        };
        // 12:00 IST is 06:30 UTC.
        assert_eq!(event.date.to_rfc3339(), "2025-04-25T06:30:00+00:00");
        assert_eq!(event.price.get(), 499.0);
    }

    #[test]
    fn validate_reports_each_bad_field() {
        let mut bad = input("-5");
        bad.title = "  ".to_string();
        let Err(errors) = bad.validate() else {
            panic!("expected errors");
        };
        assert!(errors.get("title").is_some());
        assert!(errors.get("price").is_some());
        assert!(errors.get("date").is_none());
    }

    #[test]
    fn blank_price_means_free() {
        let Ok(event) = input("").validate() else {
            panic!("valid input");
        };
        assert!(event.price.is_free());
    }

    #[test]
    fn rfc3339_dates_are_accepted_as_is() {
        let Ok(date) = parse_event_datetime("2025-04-26T10:00:00Z", Some("23:00")) else {
            panic!("valid date");
        };
        assert_eq!(date.to_rfc3339(), "2025-04-26T10:00:00+00:00");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let patch = EventPatch {
            price: Some("250".to_string()),
            location: Some("   ".to_string()),
            ..EventPatch::default()
        };
        let Ok(row) = patch.into_row() else {
            panic!("valid patch");
        };
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("price"), Some(&serde_json::json!(250.0)));
        assert_eq!(row.get("location"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn patch_rejects_bad_price() {
        let patch = EventPatch {
            price: Some("free".to_string()),
            ..EventPatch::default()
        };
        let Err(errors) = patch.into_row() else {
            panic!("expected errors");
        };
        assert!(errors.get("price").is_some());
    }
}
