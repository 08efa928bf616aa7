//! Registrations and their payment status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{Event, Price, non_blank};
use super::{EventId, RegistrationId};
use crate::error::FieldErrors;

/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Payment state of a registration. Any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Initial state of every new registration.
    #[default]
    Pending,
    /// Payment received.
    Paid,
    /// Payment attempt failed.
    Failed,
    /// Payment returned.
    Refunded,
}

impl PaymentStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Paid, Self::Failed, Self::Refunded];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown payment status: {s}"))
    }
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Primary key.
    pub id: RegistrationId,
    /// Attendee name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// College or institution.
    #[serde(default)]
    pub college: Option<String>,
    /// Event registered for.
    pub event_id: EventId,
    /// Event title at the time of registration.
    pub ticket_type: String,
    /// Event price at the time of registration.
    pub amount: Price,
    /// Payment state.
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Submission time, stamped by the store.
    pub created_at: DateTime<Utc>,
}

/// Attendee details as typed into the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Phone number, any formatting.
    #[serde(default)]
    pub phone: String,
    /// College or institution.
    #[serde(default)]
    pub college: String,
}

/// Trimmed, checked attendee details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeDetails {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number as entered (trimmed).
    pub phone: String,
    /// College or institution.
    pub college: String,
}

impl RegistrationForm {
    /// Runs every field check and collects one message per failing field.
    ///
    /// # Errors
    ///
    /// Returns the collected [`FieldErrors`] when any field is invalid.
    pub fn validate(&self) -> Result<AttendeeDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let college = self.college.trim();

        if name.is_empty() {
            errors.add("name", "Name is required");
        }
        if email.is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(email) {
            errors.add("email", "Email is invalid");
        }
        if phone.is_empty() {
            errors.add("phone", "Phone number is required");
        } else if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
            errors.add("phone", "Phone number must have at least 10 digits");
        }
        if college.is_empty() {
            errors.add("college", "College is required");
        }

        errors.into_result().map(|()| AttendeeDetails {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            college: college.to_string(),
        })
    }
}

/// Shape check: one `@`, a non-empty local part, and a dotted domain whose
/// dot is not at either edge.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// A registration ready to insert (minus id and creation time).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRegistration {
    /// Attendee name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// College.
    pub college: Option<String>,
    /// Event registered for.
    pub event_id: EventId,
    /// Event title snapshot.
    pub ticket_type: String,
    /// Event price snapshot.
    pub amount: Price,
    /// Always [`PaymentStatus::Pending`] on creation.
    pub payment_status: PaymentStatus,
}

impl NewRegistration {
    /// Binds attendee details to `event`, copying its title and price.
    #[must_use]
    pub fn for_event(details: AttendeeDetails, event: &Event) -> Self {
        Self {
            name: details.name,
            email: details.email,
            phone: details.phone,
            college: non_blank(Some(details.college)),
            event_id: event.id,
            ticket_type: event.title.clone(),
            amount: event.price,
            payment_status: PaymentStatus::Pending,
        }
    }
}

/// Applies a status change to a locally held list. Returns `false` when
/// no registration with `id` is present.
pub fn patch_status(
    registrations: &mut [Registration],
    id: RegistrationId,
    status: PaymentStatus,
) -> bool {
    match registrations.iter_mut().find(|r| r.id == id) {
        Some(registration) => {
            registration.payment_status = status;
            true
        }
        None => false,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            college: "St. Xavier's".to_string(),
        }
    }

    fn event(price: f64) -> Event {
        let Ok(price) = Price::new(price) else {
            panic!("valid price");
        };
        Event {
            id: EventId::new(),
            title: "Cosplay".to_string(),
            description: None,
            date: Utc::now(),
            location: None,
            image_url: None,
            price,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn registration(status: PaymentStatus) -> Registration {
        Registration {
            id: RegistrationId::new(),
            name: "A".to_string(),
            email: "a@b.co".to_string(),
            phone: "9999999999".to_string(),
            college: None,
            event_id: EventId::new(),
            ticket_type: "Quiz".to_string(),
            amount: Price::FREE,
            payment_status: status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn valid_form_passes() {
        let Ok(details) = form().validate() else {
            panic!("form is valid");
        };
        assert_eq!(details.name, "Asha Rao");
    }

    #[test]
    fn empty_form_reports_every_field() {
        let Err(errors) = RegistrationForm::default().validate() else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn short_phone_is_rejected() {
        let mut bad = form();
        bad.phone = "12345-6789".to_string();
        let Err(errors) = bad.validate() else {
            panic!("expected errors");
        };
        assert!(errors.get("phone").is_some());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@b.co."));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.co"));
    }

    #[test]
    fn new_registration_snapshots_event() {
        let Ok(details) = form().validate() else {
            panic!("form is valid");
        };
        let event = event(499.0);
        let new = NewRegistration::for_event(details, &event);
        assert_eq!(new.ticket_type, "Cosplay");
        assert_eq!(new.amount.get(), 499.0);
        assert_eq!(new.payment_status, PaymentStatus::Pending);
        assert_eq!(new.event_id, event.id);
    }

    #[test]
    fn patch_status_updates_only_target() {
        let mut list = vec![
            registration(PaymentStatus::Pending),
            registration(PaymentStatus::Pending),
        ];
        let Some(target) = list.get(1).map(|r| r.id) else {
            panic!("fixture has two rows");
        };
        assert!(patch_status(&mut list, target, PaymentStatus::Paid));
        let statuses: Vec<PaymentStatus> = list.iter().map(|r| r.payment_status).collect();
        assert_eq!(statuses, vec![PaymentStatus::Pending, PaymentStatus::Paid]);
        assert!(!patch_status(&mut list, RegistrationId::new(), PaymentStatus::Failed));
    }

    #[test]
    fn any_transition_is_allowed() {
        let mut list = vec![registration(PaymentStatus::Refunded)];
        let Some(id) = list.first().map(|r| r.id) else {
            panic!("fixture has a row");
        };
        assert!(patch_status(&mut list, id, PaymentStatus::Pending));
        assert!("REFUNDED".parse::<PaymentStatus>().is_ok());
    }
}
