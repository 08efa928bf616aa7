//! Session gate for the admin back office.
//!
//! [`SessionContext`] tracks the authentication state of every token the
//! identity provider has announced; [`require_admin`] consults it before
//! any `/admin` handler runs.

pub mod gate;
pub mod session_context;

pub use gate::{AdminUser, GateDecision, bearer_token, require_admin};
pub use session_context::{AuthState, SessionContext};
