//! `devcamper-auth`: principals and authorization decisions.
//!
//! Token issuance and password handling live outside this service; this crate
//! only verifies tokens and answers allow/deny questions. It is decoupled from
//! HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, authorize_owner, authorize_roles};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use principal::{Principal, PrincipalId};
pub use roles::Role;
