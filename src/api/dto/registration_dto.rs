//! Registration DTOs for the public form and the admin list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::catalog_dto::EventView;
use crate::domain::{Registration, RegistrationForm};

/// Request body for `POST /registrations`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegistrationRequest {
    /// Event to register for.
    pub event_id: Option<uuid::Uuid>,
    /// Attendee name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone, at least 10 digits.
    pub phone: String,
    /// College or institution.
    pub college: String,
}

impl RegistrationRequest {
    /// Splits off the form fields.
    #[must_use]
    pub fn into_form(self) -> (Option<uuid::Uuid>, RegistrationForm) {
        let form = RegistrationForm {
            name: self.name,
            email: self.email,
            phone: self.phone,
            college: self.college,
        };
        (self.event_id, form)
    }
}

/// One stored registration.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegistrationView {
    /// Registration id, shown on the confirmation page.
    pub id: uuid::Uuid,
    /// Attendee name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// College.
    pub college: Option<String>,
    /// Registered event.
    pub event_id: uuid::Uuid,
    /// Event title at submission time.
    pub ticket_type: String,
    /// Event price at submission time.
    pub amount: f64,
    /// `pending`, `paid`, `failed` or `refunded`.
    pub payment_status: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl From<&Registration> for RegistrationView {
    fn from(reg: &Registration) -> Self {
        Self {
            id: *reg.id.as_uuid(),
            name: reg.name.clone(),
            email: reg.email.clone(),
            phone: reg.phone.clone(),
            college: reg.college.clone(),
            event_id: *reg.event_id.as_uuid(),
            ticket_type: reg.ticket_type.clone(),
            amount: reg.amount.get(),
            payment_status: reg.payment_status.as_str().to_string(),
            created_at: reg.created_at,
        }
    }
}

/// Confirmation record: the registration and the event it is for.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmationResponse {
    /// The stored registration.
    pub registration: RegistrationView,
    /// The event, absent if it was deleted since.
    pub event: Option<EventView>,
}

/// Query parameters for the admin registration list and CSV export.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegistrationListParams {
    /// Case-insensitive text matched against name, email, phone and college.
    #[serde(default)]
    pub search: Option<String>,
    /// `all` or one payment status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Response body for `GET /admin/registrations`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationListResponse {
    /// Matching registrations, newest first.
    pub data: Vec<RegistrationView>,
    /// Number of matching registrations.
    pub total: usize,
}

/// Request body for `PATCH /admin/registrations/{id}/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    /// New payment status.
    pub payment_status: String,
}
