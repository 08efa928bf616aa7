//! Gallery images grouped by festival year.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GalleryImageId;
use super::event::non_blank;
use crate::error::FieldErrors;

/// Year preselected in the upload form.
pub const DEFAULT_GALLERY_YEAR: &str = "2025";

/// A stored gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Primary key.
    pub id: GalleryImageId,
    /// Caption title.
    #[serde(default)]
    pub title: Option<String>,
    /// Caption text.
    #[serde(default)]
    pub description: Option<String>,
    /// Public URL of the image.
    pub image_url: String,
    /// Festival year the photo belongs to, e.g. `"2024"`.
    pub year: String,
    /// Upload time, stamped by the store.
    pub created_at: DateTime<Utc>,
}

/// Upload form fields (the file itself travels separately).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryInput {
    /// Caption title.
    #[serde(default)]
    pub title: Option<String>,
    /// Caption text.
    #[serde(default)]
    pub description: Option<String>,
    /// Festival year; defaults to [`DEFAULT_GALLERY_YEAR`].
    #[serde(default)]
    pub year: Option<String>,
}

/// Validated gallery metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGalleryImage {
    /// Caption title.
    pub title: Option<String>,
    /// Caption text.
    pub description: Option<String>,
    /// Four-digit year.
    pub year: String,
}

impl GalleryInput {
    /// Validates the year and normalizes the captions.
    ///
    /// # Errors
    ///
    /// Returns a `year` field error unless the year is four digits.
    pub fn validate(self) -> Result<NewGalleryImage, FieldErrors> {
        let year = non_blank(self.year).unwrap_or_else(|| DEFAULT_GALLERY_YEAR.to_string());
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(FieldErrors::single("year", "Year must be four digits"));
        }
        Ok(NewGalleryImage {
            title: non_blank(self.title),
            description: non_blank(self.description),
            year,
        })
    }
}

/// Distinct years present in `images`, most recent first.
#[must_use]
pub fn years_desc(images: &[GalleryImage]) -> Vec<String> {
    let mut years: Vec<String> = images.iter().map(|img| img.year.clone()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Groups images by year, most recent year first. Order inside a group
/// follows the input order.
#[must_use]
pub fn group_by_year(images: &[GalleryImage]) -> Vec<(String, Vec<&GalleryImage>)> {
    years_desc(images)
        .into_iter()
        .map(|year| {
            let members = images.iter().filter(|img| img.year == year).collect();
            (year, members)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn image(year: &str) -> GalleryImage {
        GalleryImage {
            id: GalleryImageId::new(),
            title: None,
            description: None,
            image_url: format!("http://localhost/storage/event_images/{year}.jpg"),
            year: year.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn years_are_distinct_and_descending() {
        let images = vec![image("2023"), image("2025"), image("2023"), image("2024")];
        assert_eq!(years_desc(&images), vec!["2025", "2024", "2023"]);
    }

    #[test]
    fn groups_follow_year_order() {
        let images = vec![image("2024"), image("2025"), image("2024")];
        let groups = group_by_year(&images);
        assert_eq!(groups.len(), 2);
        let Some((year, members)) = groups.first() else {
            panic!("expected a group");
        };
        assert_eq!(year, "2025");
        assert_eq!(members.len(), 1);
        let Some((_, older)) = groups.get(1) else {
            panic!("expected a second group");
        };
        assert_eq!(older.len(), 2);
    }

    #[test]
    fn input_defaults_year_and_rejects_bad_year() {
        let Ok(new) = GalleryInput::default().validate() else {
            panic!("default year is valid");
        };
        assert_eq!(new.year, DEFAULT_GALLERY_YEAR);

        let bad = GalleryInput {
            year: Some("25".to_string()),
            ..GalleryInput::default()
        };
        assert!(bad.validate().is_err());
    }
}
