//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Verifies an encoded token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// HMAC-SHA256 shared-secret validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use crate::{PrincipalId, Role};

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn fresh_claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            role: Role::Admin,
            issued_at: now - Duration::seconds(5),
            expires_at: now + Duration::minutes(30),
        }
    }

    #[test]
    fn round_trips_a_signed_token() {
        let now = Utc::now();
        let claims = fresh_claims(now);
        let token = mint("secret", &claims);

        let validator = Hs256JwtValidator::new("secret");
        let decoded = validator.validate(&token, now).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, Role::Admin);
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let now = Utc::now();
        let token = mint("other", &fresh_claims(now));

        let validator = Hs256JwtValidator::new("secret");
        assert!(matches!(
            validator.validate(&token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_an_expired_token() {
        let now = Utc::now();
        let token = mint("secret", &fresh_claims(now));

        let validator = Hs256JwtValidator::new("secret");
        let later = now + Duration::hours(1);
        assert_eq!(validator.validate(&token, later), Err(TokenValidationError::Expired));
    }
}
