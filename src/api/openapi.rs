//! OpenAPI document for every REST endpoint.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers::{admin, auth, events, gallery, registrations, sponsors, system};

/// Generated API description, served by Swagger UI.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Manfete Portal API",
        description = "Festival catalog, registrations and admin back office."
    ),
    paths(
        system::health_handler,
        system::pages_handler,
        system::festival_handler,
        system::storage_handler,
        events::list_events,
        events::get_event,
        gallery::list_gallery,
        gallery::list_years,
        sponsors::list_sponsors,
        registrations::create_registration,
        registrations::get_registration,
        auth::login,
        auth::signup,
        auth::logout,
        auth::current_session,
        admin::dashboard,
        admin::create_event,
        admin::update_event,
        admin::delete_event,
        admin::create_gallery_image,
        admin::delete_gallery_image,
        admin::create_sponsor,
        admin::update_sponsor,
        admin::delete_sponsor,
        admin::list_registrations,
        admin::update_registration_status,
        admin::export_registrations,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Health and site configuration"),
        (name = "Events", description = "Public event catalog"),
        (name = "Gallery", description = "Public photo gallery"),
        (name = "Sponsors", description = "Public sponsor list"),
        (name = "Registrations", description = "Event registration"),
        (name = "Auth", description = "Sign-in and sessions"),
        (name = "Admin", description = "Back office, admin session required"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme used by the gated routes.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_admin_paths_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/admin/registrations/export"));
        assert!(doc.paths.paths.contains_key("/api/v1/events"));
        let has_bearer = doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer"));
        assert!(has_bearer);
    }
}
