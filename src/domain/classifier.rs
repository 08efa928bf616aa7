//! Day-bucket and category classification for festival events.
//!
//! Both classifiers are lookup tables: the day bucket is an exact match of
//! the event's calendar date (in festival local time) against the three
//! scheduled days, and the category is the first keyword group whose
//! keyword occurs in the lower-cased title.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Festival local time is Indian Standard Time (UTC+05:30).
const FESTIVAL_UTC_OFFSET_SECS: i32 = 5 * 3_600 + 30 * 60;

/// Scheduled festival days as `(year, month, day)`.
pub const FESTIVAL_DAYS: [(i32, u32, u32); 3] = [(2025, 4, 24), (2025, 4, 25), (2025, 4, 26)];

/// Returns the festival's fixed UTC offset.
#[must_use]
pub fn festival_offset() -> FixedOffset {
    FixedOffset::east_opt(FESTIVAL_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Coarse day bucket of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDay {
    /// First festival day (Apr 24).
    Day1,
    /// Second festival day (Apr 25).
    Day2,
    /// Third festival day (Apr 26).
    Day3,
    /// Outside the festival schedule.
    Other,
}

impl EventDay {
    /// All buckets in display order.
    pub const ALL: [Self; 4] = [Self::Day1, Self::Day2, Self::Day3, Self::Other];

    /// Stable string form (`day1` … `other`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day1 => "day1",
            Self::Day2 => "day2",
            Self::Day3 => "day3",
            Self::Other => "other",
        }
    }

    /// Calendar date of the bucket, `None` for [`EventDay::Other`].
    #[must_use]
    pub fn calendar_date(self) -> Option<NaiveDate> {
        let (y, m, d) = match self {
            Self::Day1 => FESTIVAL_DAYS.first(),
            Self::Day2 => FESTIVAL_DAYS.get(1),
            Self::Day3 => FESTIVAL_DAYS.get(2),
            Self::Other => None,
        }?;
        NaiveDate::from_ymd_opt(*y, *m, *d)
    }
}

impl fmt::Display for EventDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown day: {s}"))
    }
}

/// Event category derived from the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Opening, closing and prize ceremonies.
    Ceremony,
    /// Debates, quizzes and other competitions of the mind.
    Academic,
    /// Visual arts.
    Art,
    /// Stage performances and contests.
    Performance,
    /// Anything not matched by a keyword group.
    Other,
}

impl EventCategory {
    /// All categories in priority order.
    pub const ALL: [Self; 5] = [
        Self::Ceremony,
        Self::Academic,
        Self::Art,
        Self::Performance,
        Self::Other,
    ];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ceremony => "ceremony",
            Self::Academic => "academic",
            Self::Art => "art",
            Self::Performance => "performance",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Keyword groups, checked in order. First hit wins.
const CATEGORY_KEYWORDS: [(EventCategory, &[&str]); 4] = [
    (
        EventCategory::Ceremony,
        &["inauguration", "ceremony", "opening", "closing", "prize", "valedictory"],
    ),
    (
        EventCategory::Academic,
        &["debate", "quiz", "business", "seminar", "talk", "workshop", "elocution"],
    ),
    (
        EventCategory::Art,
        &["painting", "photography", "art", "sketch", "drawing", "craft", "rangoli"],
    ),
    (
        EventCategory::Performance,
        &[
            "cosplay",
            "manhunt",
            "queen",
            "dance",
            "music",
            "singing",
            "band",
            "drama",
            "fashion",
            "performance",
        ],
    ),
];

/// Maps an event start time to its festival day bucket.
#[must_use]
pub fn event_day(date: DateTime<Utc>) -> EventDay {
    let local = date.with_timezone(&festival_offset()).date_naive();
    [EventDay::Day1, EventDay::Day2, EventDay::Day3]
        .into_iter()
        .find(|day| day.calendar_date() == Some(local))
        .unwrap_or(EventDay::Other)
}

/// Maps an event title to its category by keyword containment.
#[must_use]
pub fn event_category(title: &str) -> EventCategory {
    let title = title.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| title.contains(kw)))
        .map_or(EventCategory::Other, |(category, _)| *category)
}
