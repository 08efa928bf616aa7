//! Catalog service: typed queries and commands over the catalog and
//! object stores.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::domain::gallery::years_desc;
use crate::domain::workflow::{Browsing, Confirmed};
use crate::domain::{
    Event, EventId, EventInput, EventPatch, GalleryImage, GalleryImageId, GalleryInput,
    PaymentStatus, Registration, RegistrationForm, RegistrationId, Sponsor, SponsorId,
    SponsorInput,
};
use crate::error::PortalError;
use crate::objects::{EVENT_IMAGES, ImageUpload, ObjectStore, SPONSOR_LOGOS};
use crate::store::{CatalogStore, Query, Row, StoreError, Table, decode, decode_all, encode};

/// Name prefix of uploaded gallery images.
const GALLERY_PREFIX: &str = "gallery";

/// Exact row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    /// Number of events.
    pub events: u64,
    /// Number of gallery images.
    pub gallery_images: u64,
    /// Number of registrations.
    pub registrations: u64,
}

/// A registration together with the event it references, if that event
/// still exists.
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// The registration.
    pub registration: Registration,
    /// The referenced event.
    pub event: Option<Event>,
}

/// Orchestration layer for catalog reads and admin mutations.
///
/// Mutations follow one order: validate → upload (if any) → write row.
/// A failure at any step leaves the catalog unchanged. Callers re-fetch
/// lists after a mutation; nothing here caches.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    objects: Arc<dyn ObjectStore>,
}

impl CatalogService {
    /// Creates a service over the given stores.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// The underlying catalog store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// The underlying object store.
    #[must_use]
    pub fn objects(&self) -> &Arc<dyn ObjectStore> {
        &self.objects
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// All events, earliest first.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Store`] when the store fails.
    pub async fn list_events(&self) -> Result<Vec<Event>, PortalError> {
        let rows = self
            .store
            .select(Table::Events, &Query::all().order_by("date", true))
            .await?;
        Ok(decode_all(rows)?)
    }

    /// One event by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when no such event exists.
    pub async fn get_event(&self, id: EventId) -> Result<Event, PortalError> {
        self.find_one(Table::Events, *id.as_uuid()).await
    }

    /// Validates and stores a new event, uploading its image first.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Validation`] before any I/O when a field is invalid.
    /// - [`PortalError::Store`] when the upload or the insert fails.
    pub async fn create_event(
        &self,
        input: EventInput,
        image: Option<ImageUpload>,
    ) -> Result<Event, PortalError> {
        let new = input.validate()?;
        let mut row = encode(&new)?;
        if let Some(image) = image {
            let url = self.store_image(EVENT_IMAGES, None, image).await?;
            row.insert("image_url".into(), Value::String(url));
        }
        let event: Event = decode(self.store.insert(Table::Events, row).await?)?;
        tracing::info!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    /// Applies a partial update, uploading a replacement image first. The
    /// replaced image is removed best effort once the row is written.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Validation`] when a present field is invalid.
    /// - [`PortalError::NotFound`] when the event does not exist.
    /// - [`PortalError::Store`] when the upload or the update fails.
    pub async fn update_event(
        &self,
        id: EventId,
        patch: EventPatch,
        image: Option<ImageUpload>,
    ) -> Result<Event, PortalError> {
        let mut row = patch.into_row()?;
        let current = self.get_event(id).await?;
        let replaced = match image {
            Some(image) => {
                let url = self.store_image(EVENT_IMAGES, None, image).await?;
                row.insert("image_url".into(), Value::String(url));
                current.image_url
            }
            None => None,
        };
        let event: Event = self.patch_row(Table::Events, *id.as_uuid(), row).await?;
        if let Some(old) = replaced {
            self.remove_image_best_effort(&old).await;
        }
        tracing::info!(event_id = %event.id, "event updated");
        Ok(event)
    }

    /// Deletes an event and, best effort, its stored image.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the event does not exist.
    pub async fn delete_event(&self, id: EventId) -> Result<(), PortalError> {
        let event = self.get_event(id).await?;
        if let Some(url) = &event.image_url {
            self.remove_image_best_effort(url).await;
        }
        self.delete_row(Table::Events, *id.as_uuid()).await?;
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }

    // ── Gallery ─────────────────────────────────────────────────────────

    /// All gallery images, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Store`] when the store fails.
    pub async fn list_gallery(&self) -> Result<Vec<GalleryImage>, PortalError> {
        let rows = self
            .store
            .select(Table::Gallery, &Query::all().order_by("created_at", false))
            .await?;
        Ok(decode_all(rows)?)
    }

    /// Distinct gallery years, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Store`] when the store fails.
    pub async fn list_gallery_years(&self) -> Result<Vec<String>, PortalError> {
        Ok(years_desc(&self.list_gallery().await?))
    }

    /// Uploads an image and records it in the gallery.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Validation`] when the image is missing or the year is malformed.
    /// - [`PortalError::Store`] when the upload or the insert fails.
    pub async fn create_gallery_image(
        &self,
        input: GalleryInput,
        image: Option<ImageUpload>,
    ) -> Result<GalleryImage, PortalError> {
        let new = input.validate()?;
        let image =
            image.ok_or_else(|| PortalError::field("image", "Please select an image to upload"))?;
        let url = self
            .store_image(EVENT_IMAGES, Some(GALLERY_PREFIX), image)
            .await?;

        let mut row = Row::new();
        row.insert("title".into(), new.title.map_or(Value::Null, Value::String));
        row.insert(
            "description".into(),
            new.description.map_or(Value::Null, Value::String),
        );
        row.insert("year".into(), Value::String(new.year));
        row.insert("image_url".into(), Value::String(url));

        let image: GalleryImage = decode(self.store.insert(Table::Gallery, row).await?)?;
        tracing::info!(image_id = %image.id, year = %image.year, "gallery image added");
        Ok(image)
    }

    /// Deletes a gallery image and, best effort, its file.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the image does not exist.
    pub async fn delete_gallery_image(&self, id: GalleryImageId) -> Result<(), PortalError> {
        let image: GalleryImage = self.find_one(Table::Gallery, *id.as_uuid()).await?;
        self.remove_image_best_effort(&image.image_url).await;
        self.delete_row(Table::Gallery, *id.as_uuid()).await?;
        tracing::info!(image_id = %id, "gallery image deleted");
        Ok(())
    }

    // ── Sponsors ────────────────────────────────────────────────────────

    /// All sponsors by name.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Store`] when the store fails.
    pub async fn list_sponsors(&self) -> Result<Vec<Sponsor>, PortalError> {
        let rows = self
            .store
            .select(Table::Sponsors, &Query::all().order_by("name", true))
            .await?;
        Ok(decode_all(rows)?)
    }

    /// Validates and stores a new sponsor, uploading its logo first.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Validation`] when the name is missing or the tier unknown.
    /// - [`PortalError::Store`] when the upload or the insert fails.
    pub async fn create_sponsor(
        &self,
        input: SponsorInput,
        logo: Option<ImageUpload>,
    ) -> Result<Sponsor, PortalError> {
        let mut row = input.into_new_row()?;
        if let Some(logo) = logo {
            let url = self.store_image(SPONSOR_LOGOS, None, logo).await?;
            row.insert("logo_url".into(), Value::String(url));
        }
        let sponsor: Sponsor = decode(self.store.insert(Table::Sponsors, row).await?)?;
        tracing::info!(sponsor_id = %sponsor.id, name = %sponsor.name, "sponsor created");
        Ok(sponsor)
    }

    /// Applies a partial update, uploading a replacement logo first. The
    /// replaced logo is removed best effort once the row is written.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Validation`] when a present field is invalid.
    /// - [`PortalError::NotFound`] when the sponsor does not exist.
    /// - [`PortalError::Store`] when the upload or the update fails.
    pub async fn update_sponsor(
        &self,
        id: SponsorId,
        input: SponsorInput,
        logo: Option<ImageUpload>,
    ) -> Result<Sponsor, PortalError> {
        let mut row = input.into_patch_row()?;
        let current: Sponsor = self.find_one(Table::Sponsors, *id.as_uuid()).await?;
        let replaced = match logo {
            Some(logo) => {
                let url = self.store_image(SPONSOR_LOGOS, None, logo).await?;
                row.insert("logo_url".into(), Value::String(url));
                current.logo_url
            }
            None => None,
        };
        let sponsor: Sponsor = self.patch_row(Table::Sponsors, *id.as_uuid(), row).await?;
        if let Some(old) = replaced {
            self.remove_image_best_effort(&old).await;
        }
        tracing::info!(sponsor_id = %sponsor.id, "sponsor updated");
        Ok(sponsor)
    }

    /// Deletes a sponsor and, best effort, its logo.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the sponsor does not exist.
    pub async fn delete_sponsor(&self, id: SponsorId) -> Result<(), PortalError> {
        let sponsor: Sponsor = self.find_one(Table::Sponsors, *id.as_uuid()).await?;
        if let Some(url) = &sponsor.logo_url {
            self.remove_image_best_effort(url).await;
        }
        self.delete_row(Table::Sponsors, *id.as_uuid()).await?;
        tracing::info!(sponsor_id = %id, "sponsor deleted");
        Ok(())
    }

    // ── Registrations ───────────────────────────────────────────────────

    /// Runs the registration workflow for `event_id` and stores the result.
    ///
    /// The event must be in the current event list. The form is validated
    /// before anything is written; the stored row snapshots the event's
    /// title and price and starts as pending.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Validation`] for an unknown event or invalid fields.
    /// - [`PortalError::Store`] when the insert fails.
    pub async fn create_registration(
        &self,
        event_id: EventId,
        form: RegistrationForm,
    ) -> Result<Confirmed, PortalError> {
        let events = self.list_events().await?;
        let selected = Browsing::new(events)
            .select(event_id)
            .map_err(|rejected| PortalError::Validation(rejected.errors))?;
        let submitted = selected
            .fill(form)
            .submit()
            .map_err(|rejected| PortalError::Validation(rejected.errors))?;

        let inserted = match encode(submitted.registration()) {
            Ok(row) => self.store.insert(Table::Registrations, row).await,
            Err(err) => Err(err),
        };
        match inserted.and_then(decode::<Registration>) {
            Ok(registration) => {
                tracing::info!(
                    registration_id = %registration.id,
                    event_id = %registration.event_id,
                    "registration stored"
                );
                Ok(submitted.confirm(registration))
            }
            Err(err) => {
                let form = submitted.fail();
                tracing::warn!(
                    event_id = %form.event().id,
                    error = %err,
                    "registration insert failed"
                );
                Err(err.into())
            }
        }
    }

    /// Overwrites a registration's payment status. Any transition is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the registration does not exist.
    pub async fn update_registration_status(
        &self,
        id: RegistrationId,
        status: PaymentStatus,
    ) -> Result<Registration, PortalError> {
        let mut row = Row::new();
        row.insert(
            "payment_status".into(),
            Value::String(status.as_str().to_string()),
        );
        let registration: Registration = self
            .patch_row(Table::Registrations, *id.as_uuid(), row)
            .await?;
        tracing::info!(registration_id = %id, status = %status, "payment status updated");
        Ok(registration)
    }

    /// All registrations, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Store`] when the store fails.
    pub async fn list_registrations(&self) -> Result<Vec<Registration>, PortalError> {
        let rows = self
            .store
            .select(
                Table::Registrations,
                &Query::all().order_by("created_at", false),
            )
            .await?;
        Ok(decode_all(rows)?)
    }

    /// A registration with its event, for the confirmation page.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the registration does not exist.
    pub async fn get_registration(&self, id: RegistrationId) -> Result<Confirmation, PortalError> {
        let registration: Registration = self.find_one(Table::Registrations, *id.as_uuid()).await?;
        let event = match self.get_event(registration.event_id).await {
            Ok(event) => Some(event),
            Err(PortalError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        Ok(Confirmation {
            registration,
            event,
        })
    }

    /// Exact counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Store`] when any count fails.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, PortalError> {
        let (events, gallery_images, registrations) = tokio::try_join!(
            self.store.count(Table::Events),
            self.store.count(Table::Gallery),
            self.store.count(Table::Registrations),
        )?;
        Ok(DashboardStats {
            events,
            gallery_images,
            registrations,
        })
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    async fn find_one<T: serde::de::DeserializeOwned>(
        &self,
        table: Table,
        id: uuid::Uuid,
    ) -> Result<T, PortalError> {
        let row = self
            .store
            .select(table, &Query::all().eq("id", id.to_string()).limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { table, id })?;
        Ok(decode(row)?)
    }

    async fn patch_row<T: serde::de::DeserializeOwned>(
        &self,
        table: Table,
        id: uuid::Uuid,
        mut row: Row,
    ) -> Result<T, PortalError> {
        if table.tracks_updates() {
            row.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
        }
        Ok(decode(self.store.update(table, id, row).await?)?)
    }

    async fn delete_row(&self, table: Table, id: uuid::Uuid) -> Result<(), PortalError> {
        if self.store.delete(table, id).await? == 0 {
            return Err(StoreError::NotFound { table, id }.into());
        }
        Ok(())
    }

    async fn store_image(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        image: ImageUpload,
    ) -> Result<String, PortalError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let name = image.object_name(prefix, Utc::now().timestamp_millis(), &nonce);
        self.objects.upload(bucket, &name, image.bytes).await?;
        Ok(self.objects.public_url(bucket, &name))
    }

    async fn remove_image_best_effort(&self, url: &str) {
        let Some((bucket, path)) = self.objects.locate(url) else {
            return;
        };
        if let Err(err) = self.objects.remove(&bucket, &[path]).await {
            tracing::warn!(%bucket, error = %err, "stored image could not be removed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::objects::MemoryObjectStore;
    use crate::store::MemoryStore;

    struct Fixture {
        service: CatalogService,
        store: Arc<MemoryStore>,
        objects: Arc<MemoryObjectStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let objects = Arc::new(MemoryObjectStore::new("http://localhost:3000"));
        let service = CatalogService::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            Arc::clone(&objects) as Arc<dyn ObjectStore>,
        );
        Fixture {
            service,
            store,
            objects,
        }
    }

    fn event_input(title: &str, date: &str, price: &str) -> EventInput {
        EventInput {
            title: title.to_string(),
            date: date.to_string(),
            price: Some(price.to_string()),
            ..EventInput::default()
        }
    }

    fn png() -> ImageUpload {
        ImageUpload {
            file_name: "poster.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn form(name: &str) -> RegistrationForm {
        RegistrationForm {
            name: name.to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            college: "Loyola".to_string(),
        }
    }

    #[tokio::test]
    async fn events_are_listed_by_date() {
        let f = fixture();
        for (title, date) in [("Later", "2025-04-26"), ("Sooner", "2025-04-24")] {
            let Ok(_) = f.service.create_event(event_input(title, date, ""), None).await else {
                panic!("create failed");
            };
        }
        let Ok(events) = f.service.list_events().await else {
            panic!("list failed");
        };
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn price_round_trips_as_number() {
        let f = fixture();
        let Ok(created) = f
            .service
            .create_event(event_input("Cosplay", "2025-04-25", "499"), None)
            .await
        else {
            panic!("create failed");
        };
        let Ok(fetched) = f.service.get_event(created.id).await else {
            panic!("get failed");
        };
        assert_eq!(fetched.price.get(), 499.0);
        assert_eq!(fetched.price.label(), "₹499");
    }

    #[tokio::test]
    async fn invalid_price_writes_nothing() {
        let f = fixture();
        let result = f
            .service
            .create_event(event_input("Quiz", "2025-04-25", "-10"), Some(png()))
            .await;
        assert!(matches!(result, Err(PortalError::Validation(_))));
        assert_eq!(f.store.write_count(), 0);
        assert!(f.objects.is_empty().await);
    }

    #[tokio::test]
    async fn image_is_uploaded_before_insert() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Painting", "2025-04-26", "0"), Some(png()))
            .await
        else {
            panic!("create failed");
        };
        let Some(url) = event.image_url else {
            panic!("image url stored");
        };
        assert!(url.starts_with("http://localhost:3000/storage/event_images/"));
        assert!(url.ends_with(".png"));
        assert_eq!(f.objects.len().await, 1);
    }

    #[tokio::test]
    async fn delete_removes_image_and_row() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Painting", "2025-04-26", "0"), Some(png()))
            .await
        else {
            panic!("create failed");
        };
        let Ok(()) = f.service.delete_event(event.id).await else {
            panic!("delete failed");
        };
        assert!(f.objects.is_empty().await);
        assert!(matches!(
            f.service.get_event(event.id).await,
            Err(PortalError::NotFound(_))
        ));
        assert!(matches!(
            f.service.delete_event(event.id).await,
            Err(PortalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_event_refreshes_updated_at() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Quiz", "2025-04-25", "0"), None)
            .await
        else {
            panic!("create failed");
        };
        let patch = EventPatch {
            price: Some("150".to_string()),
            ..EventPatch::default()
        };
        let Ok(updated) = f.service.update_event(event.id, patch, None).await else {
            panic!("update failed");
        };
        assert_eq!(updated.price.get(), 150.0);
        assert_eq!(updated.title, "Quiz");
        assert!(updated.updated_at >= event.updated_at);
    }

    #[tokio::test]
    async fn back_to_back_uploads_keep_their_own_images() {
        let f = fixture();
        let mut created = Vec::new();
        for title in ["Quiz", "Debate"] {
            let Ok(event) = f
                .service
                .create_event(event_input(title, "2025-04-25", "0"), Some(png()))
                .await
            else {
                panic!("create failed");
            };
            created.push(event);
        }
        let (Some(first), Some(second)) = (created.first(), created.get(1)) else {
            panic!("two events expected");
        };
        assert_ne!(first.image_url, second.image_url);
        assert_eq!(f.objects.len().await, 2);

        let Ok(()) = f.service.delete_event(second.id).await else {
            panic!("delete failed");
        };
        let Some((bucket, path)) = first.image_url.as_deref().and_then(|u| f.objects.locate(u))
        else {
            panic!("first image url not local");
        };
        assert!(f.objects.read(&bucket, &path).await.is_ok());
    }

    #[tokio::test]
    async fn replacing_an_image_removes_the_old_one() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Painting", "2025-04-26", "0"), Some(png()))
            .await
        else {
            panic!("create failed");
        };
        let Ok(updated) = f
            .service
            .update_event(event.id, EventPatch::default(), Some(png()))
            .await
        else {
            panic!("update failed");
        };
        assert_ne!(updated.image_url, event.image_url);
        assert_eq!(f.objects.len().await, 1);
    }

    #[tokio::test]
    async fn update_of_missing_rows_uploads_nothing() {
        let f = fixture();
        let result = f
            .service
            .update_event(EventId::new(), EventPatch::default(), Some(png()))
            .await;
        assert!(matches!(result, Err(PortalError::NotFound(_))));
        let result = f
            .service
            .update_sponsor(SponsorId::new(), SponsorInput::default(), Some(png()))
            .await;
        assert!(matches!(result, Err(PortalError::NotFound(_))));
        assert!(f.objects.is_empty().await);
    }

    #[tokio::test]
    async fn replacing_a_logo_removes_the_old_one() {
        let f = fixture();
        let input = SponsorInput {
            name: Some("Acme".to_string()),
            ..SponsorInput::default()
        };
        let Ok(sponsor) = f.service.create_sponsor(input, Some(png())).await else {
            panic!("create failed");
        };
        let Ok(updated) = f
            .service
            .update_sponsor(sponsor.id, SponsorInput::default(), Some(png()))
            .await
        else {
            panic!("update failed");
        };
        assert_ne!(updated.logo_url, sponsor.logo_url);
        assert_eq!(f.objects.len().await, 1);
    }

    #[tokio::test]
    async fn empty_name_registration_writes_nothing() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Quiz", "2025-04-25", "0"), None)
            .await
        else {
            panic!("create failed");
        };
        let writes_before = f.store.write_count();
        let result = f.service.create_registration(event.id, form("")).await;
        let Err(PortalError::Validation(errors)) = result else {
            panic!("blank name must be rejected");
        };
        assert!(errors.get("name").is_some());
        assert_eq!(f.store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn registration_snapshots_event_and_is_pending() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Cosplay", "2025-04-25", "499"), None)
            .await
        else {
            panic!("create failed");
        };
        let Ok(confirmed) = f.service.create_registration(event.id, form("Asha")).await else {
            panic!("registration failed");
        };
        let registration = confirmed.registration();
        assert_eq!(registration.amount.get(), 499.0);
        assert_eq!(registration.ticket_type, "Cosplay");
        assert_eq!(registration.payment_status, PaymentStatus::Pending);

        let Ok(confirmation) = f.service.get_registration(registration.id).await else {
            panic!("lookup failed");
        };
        assert_eq!(confirmation.event.map(|e| e.id), Some(event.id));
    }

    #[tokio::test]
    async fn unknown_event_is_a_validation_error() {
        let f = fixture();
        let result = f.service.create_registration(EventId::new(), form("Asha")).await;
        assert!(matches!(result, Err(PortalError::Validation(_))));
    }

    #[tokio::test]
    async fn status_update_returns_patched_row() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Quiz", "2025-04-25", "0"), None)
            .await
        else {
            panic!("create failed");
        };
        let Ok(confirmed) = f.service.create_registration(event.id, form("Ravi")).await else {
            panic!("registration failed");
        };
        let id = confirmed.registration().id;
        let Ok(updated) = f
            .service
            .update_registration_status(id, PaymentStatus::Refunded)
            .await
        else {
            panic!("status update failed");
        };
        assert_eq!(updated.payment_status, PaymentStatus::Refunded);
        assert_eq!(updated.name, "Ravi");
    }

    #[tokio::test]
    async fn gallery_requires_image_and_prefixes_name() {
        let f = fixture();
        let missing = f
            .service
            .create_gallery_image(GalleryInput::default(), None)
            .await;
        assert!(matches!(missing, Err(PortalError::Validation(_))));

        let Ok(image) = f
            .service
            .create_gallery_image(GalleryInput::default(), Some(png()))
            .await
        else {
            panic!("upload failed");
        };
        assert_eq!(image.year, "2025");
        assert!(image.image_url.contains("/event_images/gallery-"));
        let Ok(years) = f.service.list_gallery_years().await else {
            panic!("years failed");
        };
        assert_eq!(years, vec!["2025"]);
    }

    #[tokio::test]
    async fn sponsor_defaults_to_bronze_with_logo_bucket() {
        let f = fixture();
        let input = SponsorInput {
            name: Some("Acme".to_string()),
            ..SponsorInput::default()
        };
        let Ok(sponsor) = f.service.create_sponsor(input, Some(png())).await else {
            panic!("create failed");
        };
        assert_eq!(sponsor.tier, Some(crate::domain::SponsorTier::Bronze));
        assert!(
            sponsor
                .logo_url
                .is_some_and(|url| url.contains("/sponsor_logos/"))
        );
    }

    #[tokio::test]
    async fn dashboard_counts_rows() {
        let f = fixture();
        let Ok(event) = f
            .service
            .create_event(event_input("Quiz", "2025-04-25", "0"), None)
            .await
        else {
            panic!("create failed");
        };
        let Ok(_) = f.service.create_registration(event.id, form("Asha")).await else {
            panic!("registration failed");
        };
        let Ok(stats) = f.service.dashboard_stats().await else {
            panic!("stats failed");
        };
        assert_eq!(
            stats,
            DashboardStats {
                events: 1,
                gallery_images: 0,
                registrations: 1
            }
        );
    }
}
