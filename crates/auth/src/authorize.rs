//! Authorization predicates.
//!
//! - No IO
//! - No panics
//! - One predicate per question, applied uniformly by every handler

use thiserror::Error;

use devcamper_core::DomainError;

use crate::{Principal, PrincipalId, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("User role {0} is not authorized to access this route")]
    RoleNotAllowed(Role),

    #[error("User {0} is not authorized to modify this resource")]
    NotOwner(PrincipalId),
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        DomainError::unauthorized(err.to_string())
    }
}

/// Allow when the principal's role is one of `allowed`.
pub fn authorize_roles(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::RoleNotAllowed(principal.role))
    }
}

/// Allow when the principal owns the resource or is an administrator.
///
/// A resource without a recorded owner can only be touched by administrators.
pub fn authorize_owner(principal: &Principal, owner: Option<PrincipalId>) -> Result<(), AuthzError> {
    if principal.is_admin() || owner == Some(principal.id) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner(principal.id))
    }
}
