//! Registration page workflow as a typestate machine.
//!
//! ```text
//! Browsing ──select──▶ EventSelected ──fill──▶ DetailsFilled ──submit──▶ Submitted ──confirm──▶ Confirmed
//!                          ▲   │select                ▲   │ (invalid)          │ fail
//!                          └───┘                      └───┘◀───────────────────┘
//! ```
//!
//! Each transition consumes the current state. Rejected transitions hand
//! the unchanged state back inside [`Rejected`] together with the
//! per-field messages, so the form can be re-rendered without losing input.

use super::EventId;
use super::event::Event;
use super::registration::{NewRegistration, Registration, RegistrationForm};
use crate::error::FieldErrors;

/// A refused transition: the state it started from plus the reasons.
#[derive(Debug)]
pub struct Rejected<S> {
    /// State to continue from.
    pub state: S,
    /// Per-field messages.
    pub errors: FieldErrors,
}

impl<S> Rejected<S> {
    fn new(state: S, errors: FieldErrors) -> Self {
        Self { state, errors }
    }
}

/// No event chosen yet; holds the fetched event list.
#[derive(Debug, Clone)]
pub struct Browsing {
    events: Vec<Event>,
}

impl Browsing {
    /// Starts the flow over the events the page fetched.
    #[must_use]
    pub const fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Events available for selection.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Chooses an event from the fetched list.
    ///
    /// # Errors
    ///
    /// Hands the state back when `id` is not in the list.
    pub fn select(self, id: EventId) -> Result<EventSelected, Rejected<Self>> {
        match find(&self.events, id) {
            Some(event) => Ok(EventSelected {
                events: self.events,
                event,
            }),
            None => Err(Rejected::new(self, unknown_event())),
        }
    }
}

/// An event is chosen; attendee details not yet entered.
#[derive(Debug, Clone)]
pub struct EventSelected {
    events: Vec<Event>,
    event: Event,
}

impl EventSelected {
    /// The chosen event.
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.event
    }

    /// Replaces the selection.
    ///
    /// # Errors
    ///
    /// Keeps the previous selection when `id` is not in the list.
    pub fn select(self, id: EventId) -> Result<Self, Rejected<Self>> {
        match find(&self.events, id) {
            Some(event) => Ok(Self { event, ..self }),
            None => Err(Rejected::new(self, unknown_event())),
        }
    }

    /// Records the attendee form.
    #[must_use]
    pub fn fill(self, form: RegistrationForm) -> DetailsFilled {
        DetailsFilled {
            events: self.events,
            event: self.event,
            form,
        }
    }
}

/// The form is filled in but not yet checked.
#[derive(Debug, Clone)]
pub struct DetailsFilled {
    events: Vec<Event>,
    event: Event,
    form: RegistrationForm,
}

impl DetailsFilled {
    /// The chosen event.
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.event
    }

    /// Current form contents.
    #[must_use]
    pub const fn form(&self) -> &RegistrationForm {
        &self.form
    }

    /// Replaces the form contents.
    #[must_use]
    pub fn fill(self, form: RegistrationForm) -> Self {
        Self { form, ..self }
    }

    /// Goes back to choosing an event, keeping the form.
    ///
    /// # Errors
    ///
    /// Keeps the current state when `id` is not in the list.
    pub fn select(self, id: EventId) -> Result<Self, Rejected<Self>> {
        match find(&self.events, id) {
            Some(event) => Ok(Self { event, ..self }),
            None => Err(Rejected::new(self, unknown_event())),
        }
    }

    /// Validates the form and prepares the row to insert.
    ///
    /// # Errors
    ///
    /// Hands the state back with one message per invalid field.
    pub fn submit(self) -> Result<Submitted, Rejected<Self>> {
        match self.form.validate() {
            Ok(details) => {
                let pending = NewRegistration::for_event(details, &self.event);
                Ok(Submitted {
                    previous: self,
                    pending,
                })
            }
            Err(errors) => Err(Rejected::new(self, errors)),
        }
    }
}

/// Validated and waiting for the store to accept the row.
#[derive(Debug, Clone)]
pub struct Submitted {
    previous: DetailsFilled,
    pending: NewRegistration,
}

impl Submitted {
    /// Row to insert.
    #[must_use]
    pub const fn registration(&self) -> &NewRegistration {
        &self.pending
    }

    /// The store accepted the row.
    #[must_use]
    pub fn confirm(self, registration: Registration) -> Confirmed {
        Confirmed {
            registration,
            event: self.previous.event,
        }
    }

    /// The store rejected the row; back to the filled form.
    #[must_use]
    pub fn fail(self) -> DetailsFilled {
        self.previous
    }
}

/// Terminal state holding the confirmation record.
#[derive(Debug, Clone)]
pub struct Confirmed {
    registration: Registration,
    event: Event,
}

impl Confirmed {
    /// The stored registration, including its id.
    #[must_use]
    pub const fn registration(&self) -> &Registration {
        &self.registration
    }

    /// The event registered for.
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.event
    }

    /// Splits into the registration and its event.
    #[must_use]
    pub fn into_parts(self) -> (Registration, Event) {
        (self.registration, self.event)
    }
}

fn find(events: &[Event], id: EventId) -> Option<Event> {
    events.iter().find(|e| e.id == id).cloned()
}

fn unknown_event() -> FieldErrors {
    FieldErrors::single("event_id", "Please select an event")
}
