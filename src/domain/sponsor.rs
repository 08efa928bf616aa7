//! Sponsors and sponsorship tiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SponsorId;
use super::event::non_blank;
use crate::error::FieldErrors;

/// Sponsorship level. Declaration order is display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorTier {
    /// Top tier.
    Platinum,
    /// Second tier.
    Gold,
    /// Third tier.
    Silver,
    /// Entry tier and the form default.
    Bronze,
}

impl SponsorTier {
    /// All tiers, highest first.
    pub const ALL: [Self; 4] = [Self::Platinum, Self::Gold, Self::Silver, Self::Bronze];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platinum => "platinum",
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
        }
    }
}

impl fmt::Display for SponsorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SponsorTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tier: {s}"))
    }
}

/// Badge text shown under a sponsor's logo.
#[must_use]
pub const fn tier_label(tier: Option<SponsorTier>) -> &'static str {
    match tier {
        Some(SponsorTier::Platinum) => "Platinum Sponsor",
        Some(SponsorTier::Gold) => "Gold Sponsor",
        Some(SponsorTier::Silver) => "Silver Sponsor",
        Some(SponsorTier::Bronze) => "Bronze Sponsor",
        None => "Sponsor",
    }
}

/// A stored sponsor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    /// Primary key.
    pub id: SponsorId,
    /// Display name.
    pub name: String,
    /// Public logo URL.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Sponsor homepage.
    #[serde(default)]
    pub website_url: Option<String>,
    /// Blurb.
    #[serde(default)]
    pub description: Option<String>,
    /// Sponsorship level; absent means lowest priority.
    #[serde(default)]
    pub tier: Option<SponsorTier>,
    /// Creation time, stamped by the store.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Orders sponsors for display: by tier (untiered last), then by name.
pub fn sort_for_display(sponsors: &mut [Sponsor]) {
    sponsors.sort_by(|a, b| {
        (a.tier.is_none(), a.tier)
            .cmp(&(b.tier.is_none(), b.tier))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// Create/update form fields for a sponsor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SponsorInput {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Homepage.
    #[serde(default)]
    pub website_url: Option<String>,
    /// Blurb.
    #[serde(default)]
    pub description: Option<String>,
    /// Tier as text (`platinum` … `bronze`).
    #[serde(default)]
    pub tier: Option<String>,
}

impl SponsorInput {
    /// Renders a full row for a new sponsor. The tier defaults to bronze.
    ///
    /// # Errors
    ///
    /// Returns field errors for a missing name or an unknown tier.
    pub fn into_new_row(self) -> Result<serde_json::Map<String, serde_json::Value>, FieldErrors> {
        let mut errors = FieldErrors::new();
        if non_blank(self.name.clone()).is_none() {
            errors.add("name", "Name is required");
        }
        let tier = self.tier.clone().unwrap_or_else(|| SponsorTier::Bronze.to_string());
        let patch = Self {
            tier: Some(tier),
            ..self
        };
        match patch.into_patch_row() {
            Ok(row) => errors.into_result().map(|()| row),
            Err(more) => {
                for (field, message) in more.into_inner() {
                    errors.add(&field, message);
                }
                Err(errors)
            }
        }
    }

    /// Renders only the present fields as a patch row. A blank tier clears it.
    ///
    /// # Errors
    ///
    /// Returns field errors for a blank name or an unknown tier.
    pub fn into_patch_row(self) -> Result<serde_json::Map<String, serde_json::Value>, FieldErrors> {
        use serde_json::Value;

        let mut errors = FieldErrors::new();
        let mut row = serde_json::Map::new();

        if let Some(name) = self.name {
            match non_blank(Some(name)) {
                Some(name) => {
                    row.insert("name".into(), Value::String(name));
                }
                None => errors.add("name", "Name is required"),
            }
        }
        if let Some(tier) = self.tier {
            match non_blank(Some(tier)) {
                None => {
                    row.insert("tier".into(), Value::Null);
                }
                Some(text) => match text.parse::<SponsorTier>() {
                    Ok(tier) => {
                        row.insert("tier".into(), Value::String(tier.to_string()));
                    }
                    Err(msg) => errors.add("tier", msg),
                },
            }
        }
        for (field, value) in [
            ("website_url", self.website_url),
            ("description", self.description),
        ] {
            if let Some(value) = value {
                let value = non_blank(Some(value)).map_or(Value::Null, Value::String);
                row.insert(field.into(), value);
            }
        }

        errors.into_result().map(|()| row)
    }
}
