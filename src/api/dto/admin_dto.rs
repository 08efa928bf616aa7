//! Admin back-office DTOs: dashboard counts and the multipart edit forms.
//!
//! The form types hold the text parts of a `multipart/form-data` body.
//! The file part (`image` or `logo`) is read separately.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventInput, EventPatch, GalleryInput, SponsorInput};
use crate::service::DashboardStats;

/// Response body for `GET /admin/dashboard`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Number of events.
    pub events: u64,
    /// Number of gallery images.
    pub gallery_images: u64,
    /// Number of registrations.
    pub registrations: u64,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            events: stats.events,
            gallery_images: stats.gallery_images,
            registrations: stats.registrations,
        }
    }
}

/// Text parts of the event editor. Optional `image` file part.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct EventForm {
    /// Title.
    pub title: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339.
    pub date: Option<String>,
    /// `HH:MM`, festival local time.
    pub time: Option<String>,
    /// Venue.
    pub location: Option<String>,
    /// Externally hosted poster URL, used when no file is sent.
    pub image_url: Option<String>,
    /// Price in rupees; blank means free.
    pub price: Option<String>,
}

impl EventForm {
    /// Full input for a new event.
    #[must_use]
    pub fn into_input(self) -> EventInput {
        EventInput {
            title: self.title.unwrap_or_default(),
            description: self.description,
            date: self.date.unwrap_or_default(),
            time: self.time,
            location: self.location,
            image_url: self.image_url,
            price: self.price,
        }
    }

    /// Partial update; absent parts stay untouched.
    #[must_use]
    pub fn into_patch(self) -> EventPatch {
        EventPatch {
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            location: self.location,
            image_url: self.image_url,
            price: self.price,
        }
    }
}

/// Text parts of the gallery upload form. Required `image` file part.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct GalleryForm {
    /// Caption title.
    pub title: Option<String>,
    /// Caption text.
    pub description: Option<String>,
    /// Four-digit year, defaults to the current festival.
    pub year: Option<String>,
}

impl From<GalleryForm> for GalleryInput {
    fn from(form: GalleryForm) -> Self {
        Self {
            title: form.title,
            description: form.description,
            year: form.year,
        }
    }
}

/// Text parts of the sponsor editor. Optional `logo` file part.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SponsorForm {
    /// Display name.
    pub name: Option<String>,
    /// Website.
    pub website_url: Option<String>,
    /// Short blurb.
    pub description: Option<String>,
    /// `platinum`, `gold`, `silver` or `bronze`; blank clears it.
    pub tier: Option<String>,
}

impl From<SponsorForm> for SponsorInput {
    fn from(form: SponsorForm) -> Self {
        Self {
            name: form.name,
            website_url: form.website_url,
            description: form.description,
            tier: form.tier,
        }
    }
}
