//! Domain layer: catalog entities, classification, filters and the
//! registration workflow.
//!
//! Nothing in here performs I/O. Store rows are decoded into these types
//! by the service layer, and every list view is computed from them with
//! the pure functions below.

pub mod classifier;
pub mod csv_export;
pub mod event;
pub mod filter;
pub mod gallery;
pub mod ids;
pub mod profile;
pub mod registration;
pub mod sponsor;
pub mod workflow;

pub use classifier::{EventCategory, EventDay, event_category, event_day};
pub use event::{Event, EventInput, EventPatch, NewEvent, Price};
pub use gallery::{GalleryImage, GalleryInput, NewGalleryImage};
pub use ids::{EventId, GalleryImageId, RegistrationId, SponsorId, UserId};
pub use profile::Profile;
pub use registration::{NewRegistration, PaymentStatus, Registration, RegistrationForm};
pub use sponsor::{Sponsor, SponsorInput, SponsorTier};
