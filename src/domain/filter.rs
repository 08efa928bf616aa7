//! Search and tab filters applied to fetched lists.
//!
//! Filters never reorder: the output keeps the order of the input slice,
//! which is the order the catalog returned.

use std::fmt;
use std::str::FromStr;

use super::classifier::{EventCategory, EventDay, event_category, event_day};
use super::event::Event;
use super::gallery::GalleryImage;
use super::registration::{PaymentStatus, Registration};

/// Case-insensitive substring search. A blank needle matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Search(String);

impl Search {
    /// Normalizes the raw search box text.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// `true` when the search box is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when any of `fields` contains the needle.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_empty()
            || fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.0))
    }
}

/// Tab on the public events page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTab {
    /// Every event.
    #[default]
    All,
    /// One festival day.
    Day(EventDay),
    /// One category.
    Category(EventCategory),
}

impl EventTab {
    /// `true` when `event` belongs under this tab.
    #[must_use]
    pub fn admits(self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Day(day) => event_day(event.date) == day,
            Self::Category(category) => event_category(&event.title) == category,
        }
    }
}

impl fmt::Display for EventTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Day(day) => f.write_str(day.as_str()),
            Self::Category(category) => f.write_str(category.as_str()),
        }
    }
}

impl FromStr for EventTab {
    type Err = String;

    /// `all`, a `day*` bucket, or a category name. `other` names the
    /// category bucket.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tab = s.trim().to_ascii_lowercase();
        if tab.is_empty() || tab == "all" {
            return Ok(Self::All);
        }
        if tab.starts_with("day") {
            return tab.parse().map(Self::Day);
        }
        tab.parse()
            .map(Self::Category)
            .map_err(|_| format!("unknown tab: {s}"))
    }
}

/// Events matching `search` (title or description) and `tab`.
#[must_use]
pub fn filter_events<'a>(events: &'a [Event], search: &Search, tab: EventTab) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|event| {
            search.matches(
                std::iter::once(event.title.as_str()).chain(event.description.as_deref()),
            )
        })
        .filter(|event| tab.admits(event))
        .collect()
}

/// Year tab on the gallery page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum YearTab {
    /// Every year.
    #[default]
    All,
    /// Exactly this year.
    Year(String),
}

impl YearTab {
    /// Parses the query value; blank and `all` select everything.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Self::All,
            Some(v) => Self::Year(v.to_string()),
        }
    }
}

/// Gallery images under `tab`.
#[must_use]
pub fn filter_gallery<'a>(images: &'a [GalleryImage], tab: &YearTab) -> Vec<&'a GalleryImage> {
    images
        .iter()
        .filter(|img| match tab {
            YearTab::All => true,
            YearTab::Year(year) => &img.year == year,
        })
        .collect()
}

/// Status dropdown on the admin registrations page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status.
    #[default]
    All,
    /// Exactly this status.
    Only(PaymentStatus),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Registrations matching `search` (name, email, phone, college) and `status`.
#[must_use]
pub fn filter_registrations<'a>(
    registrations: &'a [Registration],
    search: &Search,
    status: StatusFilter,
) -> Vec<&'a Registration> {
    registrations
        .iter()
        .filter(|reg| {
            search.matches(
                [reg.name.as_str(), reg.email.as_str(), reg.phone.as_str()]
                    .into_iter()
                    .chain(reg.college.as_deref()),
            )
        })
        .filter(|reg| match status {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => reg.payment_status == wanted,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::domain::{EventId, GalleryImageId, Price, RegistrationId};

    fn event(title: &str, description: &str, date: &str) -> Event {
        let Ok(date) = DateTime::parse_from_rfc3339(date) else {
            panic!("bad fixture date");
        };
        Event {
            id: EventId::new(),
            title: title.to_string(),
            description: Some(description.to_string()),
            date: date.with_timezone(&Utc),
            location: None,
            image_url: None,
            price: Price::FREE,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn registration(name: &str, college: Option<&str>, status: PaymentStatus) -> Registration {
        Registration {
            id: RegistrationId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "9876543210".to_string(),
            college: college.map(str::to_string),
            event_id: EventId::new(),
            ticket_type: "Quiz".to_string(),
            amount: Price::FREE,
            payment_status: status,
            created_at: Utc::now(),
        }
    }

    fn image(year: &str) -> GalleryImage {
        GalleryImage {
            id: GalleryImageId::new(),
            title: None,
            description: None,
            image_url: "http://localhost/x.jpg".to_string(),
            year: year.to_string(),
            created_at: Utc::now(),
        }
    }

    fn fixture() -> Vec<Event> {
        vec![
            event("Inauguration", "Opening of the fest", "2025-04-24T04:30:00Z"),
            event("Cosplay", "Dress as your hero", "2025-04-25T08:30:00Z"),
            event("Quiz", "General knowledge", "2025-04-25T10:30:00Z"),
            event("Painting", "Canvas and colours", "2025-04-26T05:30:00Z"),
        ]
    }

    fn titles(events: &[&Event]) -> Vec<String> {
        events.iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn cosplay_is_found_under_all_day2_and_performance() {
        let events = fixture();
        let search = Search::new("cos");
        for tab in ["all", "day2", "performance"] {
            let Ok(tab) = tab.parse::<EventTab>() else {
                panic!("known tab");
            };
            assert_eq!(titles(&filter_events(&events, &search, tab)), vec!["Cosplay"]);
        }
        let Ok(day1) = "day1".parse::<EventTab>() else {
            panic!("known tab");
        };
        assert!(filter_events(&events, &search, day1).is_empty());
    }

    #[test]
    fn search_covers_description_case_insensitively() {
        let events = fixture();
        let hits = filter_events(&events, &Search::new("CANVAS"), EventTab::All);
        assert_eq!(titles(&hits), vec!["Painting"]);
    }

    #[test]
    fn empty_search_keeps_order() {
        let events = fixture();
        let hits = filter_events(&events, &Search::new("   "), EventTab::All);
        assert_eq!(hits.len(), events.len());
        assert_eq!(titles(&hits), titles(&events.iter().collect::<Vec<_>>()));
    }

    #[test]
    fn tab_parsing() {
        assert_eq!("".parse::<EventTab>(), Ok(EventTab::All));
        assert_eq!(
            "other".parse::<EventTab>(),
            Ok(EventTab::Category(EventCategory::Other))
        );
        assert_eq!("Day3".parse::<EventTab>(), Ok(EventTab::Day(EventDay::Day3)));
        assert!("day9".parse::<EventTab>().is_err());
        assert!("sports".parse::<EventTab>().is_err());
    }

    #[test]
    fn gallery_year_tab() {
        let images = vec![image("2025"), image("2024"), image("2025")];
        assert_eq!(filter_gallery(&images, &YearTab::parse(Some("2025"))).len(), 2);
        assert_eq!(filter_gallery(&images, &YearTab::parse(Some("all"))).len(), 3);
        assert_eq!(filter_gallery(&images, &YearTab::parse(None)).len(), 3);
        assert!(filter_gallery(&images, &YearTab::parse(Some("2019"))).is_empty());
    }

    #[test]
    fn registration_search_and_status_combine() {
        let regs = vec![
            registration("Asha", Some("Loyola"), PaymentStatus::Paid),
            registration("Ravi", None, PaymentStatus::Pending),
            registration("Meera", Some("Loyola"), PaymentStatus::Pending),
        ];
        let loyola = Search::new("loyola");
        assert_eq!(filter_registrations(&regs, &loyola, StatusFilter::All).len(), 2);
        let pending = StatusFilter::Only(PaymentStatus::Pending);
        let hits = filter_registrations(&regs, &loyola, pending);
        assert_eq!(hits.len(), 1);
        assert_eq!(filter_registrations(&regs, &Search::default(), pending).len(), 2);
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert!("bogus".parse::<StatusFilter>().is_err());
    }
}
