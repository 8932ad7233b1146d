//! Identity of the caller as forwarded by the auth gateway.

use std::future::{Ready, ready};

use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use serde::Serialize;

use crate::services::listing::FieldFilter;

pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const USER_BRANCH_HEADER: &str = "X-User-Branch";

/// Role that sees every branch.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Field of branch-scoped documents holding the branch name.
pub const BRANCH_FIELD: &str = "branch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserContext {
    pub role: String,
    pub branch: Option<String>,
}

impl UserContext {
    pub fn new(role: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            role: role.into(),
            branch,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == SUPER_ADMIN_ROLE
    }

    /// Branch filter applied to every list for this user.
    ///
    /// Users other than super admins only see their own branch.
    pub fn branch_scope(&self) -> Option<FieldFilter> {
        if self.is_super_admin() {
            return None;
        }
        self.branch
            .as_deref()
            .map(|branch| FieldFilter::new(BRANCH_FIELD, branch))
    }

    /// Branch new records are bound to, if the user is tied to one.
    pub fn fixed_branch(&self) -> Option<&str> {
        if self.is_super_admin() {
            None
        } else {
            self.branch.as_deref()
        }
    }

    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let role = header(USER_ROLE_HEADER)?;
        Some(Self::new(role, header(USER_BRANCH_HEADER)))
    }
}

impl FromRequest for UserContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req.headers()).ok_or_else(|| {
            log::warn!("Request to {} without user context", req.path());
            ErrorUnauthorized("missing user context")
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn branch_staff_are_scoped_to_their_branch() {
        let user = UserContext::new("receptionist", Some("Quan 1".into()));
        assert_eq!(
            user.branch_scope(),
            Some(FieldFilter::new("branch", "Quan 1"))
        );
        assert_eq!(user.fixed_branch(), Some("Quan 1"));
    }

    #[test]
    fn super_admin_sees_every_branch() {
        let user = UserContext::new(SUPER_ADMIN_ROLE, Some("Quan 1".into()));
        assert_eq!(user.branch_scope(), None);
        assert_eq!(user.fixed_branch(), None);
    }

    #[test]
    fn context_is_read_from_headers() {
        let req = TestRequest::default()
            .insert_header((USER_ROLE_HEADER, "dentist"))
            .insert_header((USER_BRANCH_HEADER, " Quan 3 "))
            .to_http_request();
        let user = UserContext::from_headers(req.headers()).unwrap();
        assert_eq!(user, UserContext::new("dentist", Some("Quan 3".into())));

        let anonymous = TestRequest::default().to_http_request();
        assert!(UserContext::from_headers(anonymous.headers()).is_none());
    }
}
