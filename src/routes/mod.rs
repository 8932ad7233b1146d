//! HTTP handlers and the helpers they share.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::models::auth::UserContext;
use crate::services::entity::Entity;
use crate::services::listing::ListRequest;
use crate::table::state::ListViewState;

pub mod api;
pub mod lists;
pub mod patients;
pub mod payments;

/// Maps a flash message level to the alert class used by templates.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Context every page starts from: alerts, the user and the active menu item.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &UserContext,
    current_page: &str,
) -> Context {
    error_context(flash_messages, user, current_page, None)
}

/// [`base_context`] with `error` shown after the pending flash alerts.
pub fn error_context(
    flash_messages: &IncomingFlashMessages,
    user: &UserContext,
    current_page: &str,
    error: Option<&str>,
) -> Context {
    let mut alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();
    if let Some(error) = error {
        alerts.push((error, "danger"));
    }

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context
}

/// Reads the list state from the query string.
///
/// Malformed parameters fall back to the default state.
pub fn list_state(req: &HttpRequest) -> ListViewState {
    serde_html_form::from_str::<ListViewState>(req.query_string())
        .unwrap_or_else(|err| {
            log::warn!("Ignoring malformed list parameters on {}: {err}", req.path());
            ListViewState::default()
        })
        .sanitized()
}

/// Restricts `request` to the user's branch where `E` is branch scoped.
pub fn restrict_to_branch<E: Entity>(user: &UserContext, request: &mut ListRequest) {
    if E::BRANCH_SCOPED
        && let Some(scope) = user.branch_scope()
    {
        request.filters.push(scope);
    }
}

/// List request for `state` as seen by `user`.
pub fn scoped_request<E: Entity>(
    user: &UserContext,
    state: &ListViewState,
    filter_field: Option<&str>,
) -> ListRequest {
    let mut request = state.to_request(filter_field);
    restrict_to_branch::<E>(user, &mut request);
    request
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;
    use crate::domain::catalog::ClinicService;
    use crate::domain::patient::Patient;
    use crate::services::listing::FieldFilter;

    #[test]
    fn alert_levels_map_to_css_classes() {
        assert_eq!(alert_level_to_str(&Level::Error), "danger");
        assert_eq!(alert_level_to_str(&Level::Warning), "warning");
        assert_eq!(alert_level_to_str(&Level::Success), "success");
        assert_eq!(alert_level_to_str(&Level::Info), "info");
        assert_eq!(alert_level_to_str(&Level::Debug), "info");
    }

    #[test]
    fn list_state_is_read_from_query_string() {
        let req = TestRequest::default()
            .uri("/patients?page=3&status=completed&search=Tran")
            .to_http_request();
        let state = list_state(&req);
        assert_eq!(state.page, 3);
        assert_eq!(state.status, "completed");
        assert_eq!(state.search, "Tran");
        assert_eq!(state.search_input, "Tran");

        let req = TestRequest::default()
            .uri("/patients?page=abc")
            .to_http_request();
        assert_eq!(list_state(&req), ListViewState::default());
    }

    #[test]
    fn branch_scope_applies_to_scoped_entities_only() {
        let user = UserContext::new("receptionist", Some("Quan 1".into()));
        let state = ListViewState::default();

        let request = scoped_request::<Patient>(&user, &state, None);
        assert_eq!(request.filters, vec![FieldFilter::new("branch", "Quan 1")]);

        let request = scoped_request::<ClinicService>(&user, &state, None);
        assert!(request.filters.is_empty());
    }
}
