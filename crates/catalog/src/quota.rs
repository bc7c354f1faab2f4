use devcamper_auth::Principal;
use devcamper_core::{DomainError, DomainResult};

/// Bootcamps a non-admin principal may own.
pub const MAX_BOOTCAMPS_PER_PUBLISHER: u64 = 5;

/// Reject a create when the principal already owns the maximum.
///
/// `owned` is the number of bootcamps currently owned by `principal`.
pub fn ensure_publish_quota(principal: &Principal, owned: u64) -> DomainResult<()> {
    if principal.is_admin() || owned < MAX_BOOTCAMPS_PER_PUBLISHER {
        return Ok(());
    }
    Err(DomainError::bad_request(format!(
        "The user with ID {} has reached the maximum of {MAX_BOOTCAMPS_PER_PUBLISHER} bootcamps",
        principal.id
    )))
}
