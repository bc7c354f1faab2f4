//! Route-level role gates.
//!
//! Ownership is checked by the services once the record is loaded; this
//! module only answers "may this role call this route at all".

use devcamper_auth::{Principal, Role, authorize_roles};
use devcamper_core::DomainError;

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

/// Create and manage bootcamps and courses.
pub const PUBLISHERS: &[Role] = &[Role::Publisher, Role::Admin];

/// Write and manage reviews.
pub const REVIEWERS: &[Role] = &[Role::User, Role::Admin];

/// User administration.
pub const ADMINS: &[Role] = &[Role::Admin];

/// The principal, when its role is in `allowed`; a 401 otherwise.
pub fn require<'a>(ctx: &'a PrincipalContext, allowed: &[Role]) -> Result<&'a Principal, ApiError> {
    let principal = ctx.principal();
    authorize_roles(principal, allowed).map_err(DomainError::from)?;
    Ok(principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use devcamper_auth::PrincipalId;

    #[test]
    fn publishers_gate_rejects_plain_users() {
        let ctx = PrincipalContext::new(PrincipalId::new(), Role::User);
        let err = require(&ctx, PUBLISHERS).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "User role user is not authorized to access this route");
    }

    #[test]
    fn reviewers_gate_rejects_publishers_but_not_admins() {
        let publisher = PrincipalContext::new(PrincipalId::new(), Role::Publisher);
        assert!(require(&publisher, REVIEWERS).is_err());

        let admin = PrincipalContext::new(PrincipalId::new(), Role::Admin);
        assert_eq!(require(&admin, REVIEWERS).unwrap().role, Role::Admin);
        assert!(require(&admin, ADMINS).is_ok());
    }
}
