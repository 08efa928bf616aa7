//! Public catalog DTOs: events, gallery and sponsors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::sponsor::tier_label;
use crate::domain::{Event, GalleryImage, Sponsor, event_category, event_day};

/// Query parameters for `GET /events`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListParams {
    /// Case-insensitive text matched against title and description.
    #[serde(default)]
    pub search: Option<String>,
    /// `all`, `day1`–`day3`, `ceremony`, `academic`, `art`, `performance` or `other`.
    #[serde(default)]
    pub tab: Option<String>,
}

/// One event as shown on the public pages.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventView {
    /// Event id.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Long description.
    pub description: Option<String>,
    /// Start instant (UTC).
    pub date: DateTime<Utc>,
    /// Venue.
    pub location: Option<String>,
    /// Poster URL.
    pub image_url: Option<String>,
    /// Numeric price in rupees.
    pub price: f64,
    /// `Free` or `₹<amount>`.
    pub price_label: String,
    /// Festival day bucket (`day1`, `day2`, `day3`, `other`).
    pub day: String,
    /// Category derived from the title.
    pub category: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            id: *event.id.as_uuid(),
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            location: event.location.clone(),
            image_url: event.image_url.clone(),
            price: event.price.get(),
            price_label: event.price.label(),
            day: event_day(event.date).as_str().to_string(),
            category: event_category(&event.title).as_str().to_string(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Matching events, earliest first.
    pub data: Vec<EventView>,
    /// Number of matching events.
    pub total: usize,
}

/// Query parameters for `GET /gallery`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GalleryParams {
    /// `all` or a four-digit year.
    #[serde(default)]
    pub year: Option<String>,
}

/// One gallery image.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GalleryImageView {
    /// Image id.
    pub id: uuid::Uuid,
    /// Caption title.
    pub title: Option<String>,
    /// Caption text.
    pub description: Option<String>,
    /// Public image URL.
    pub image_url: String,
    /// Festival year.
    pub year: String,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}

impl From<&GalleryImage> for GalleryImageView {
    fn from(image: &GalleryImage) -> Self {
        Self {
            id: *image.id.as_uuid(),
            title: image.title.clone(),
            description: image.description.clone(),
            image_url: image.image_url.clone(),
            year: image.year.clone(),
            created_at: image.created_at,
        }
    }
}

/// Images of one year.
#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryYearGroup {
    /// Festival year.
    pub year: String,
    /// Images of that year, newest first.
    pub images: Vec<GalleryImageView>,
}

/// Response body for `GET /gallery`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryResponse {
    /// Every year with at least one image, most recent first.
    pub years: Vec<String>,
    /// Matching images grouped by year, most recent year first.
    pub groups: Vec<GalleryYearGroup>,
    /// Number of matching images.
    pub total: usize,
}

/// Response body for `GET /gallery/years`.
#[derive(Debug, Serialize, ToSchema)]
pub struct YearsResponse {
    /// Distinct years, most recent first.
    pub years: Vec<String>,
}

/// One sponsor with its badge label.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SponsorView {
    /// Sponsor id.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Logo URL.
    pub logo_url: Option<String>,
    /// Website.
    pub website_url: Option<String>,
    /// Short blurb.
    pub description: Option<String>,
    /// `platinum`, `gold`, `silver`, `bronze`, or absent.
    pub tier: Option<String>,
    /// Badge text such as `Gold Sponsor`.
    pub tier_label: String,
}

impl From<&Sponsor> for SponsorView {
    fn from(sponsor: &Sponsor) -> Self {
        Self {
            id: *sponsor.id.as_uuid(),
            name: sponsor.name.clone(),
            logo_url: sponsor.logo_url.clone(),
            website_url: sponsor.website_url.clone(),
            description: sponsor.description.clone(),
            tier: sponsor.tier.map(|tier| tier.as_str().to_string()),
            tier_label: tier_label(sponsor.tier).to_string(),
        }
    }
}

/// Response body for `GET /sponsors`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SponsorListResponse {
    /// Sponsors by tier (platinum first, untiered last), then name.
    pub data: Vec<SponsorView>,
}
