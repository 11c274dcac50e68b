//! Signed access tokens (HS256 JWT).

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::errors::SessionsServiceError,
    domain::users::records::{UserRecord, UserUuid},
};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    #[must_use]
    pub fn user(&self) -> UserUuid {
        UserUuid::from_uuid(self.sub)
    }
}

/// Signs and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct AccessTokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: SignedDuration,
}

impl std::fmt::Debug for AccessTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AccessTokenSigner {
    #[must_use]
    pub fn new(secret: &[u8], ttl: SignedDuration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for the user. Returns the token and its expiry.
    ///
    /// # Errors
    ///
    /// Returns an error when the expiry overflows or signing fails.
    pub fn issue(
        &self,
        user: &UserRecord,
        roles: Vec<String>,
    ) -> Result<(String, Timestamp), SessionsServiceError> {
        let issued_at = Timestamp::now();
        let expires_at = issued_at.checked_add(self.ttl)?;

        let claims = AccessClaims {
            sub: user.uuid.into_uuid(),
            email: user.email.clone(),
            name: format!("{} {}", user.first_name, user.last_name)
                .trim()
                .to_string(),
            roles,
            iat: issued_at.as_second(),
            exp: expires_at.as_second(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok((token, expires_at))
    }

    /// Check signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionsServiceError::InvalidAccessToken`] for any malformed,
    /// forged or expired token.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, SessionsServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<AccessClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| SessionsServiceError::InvalidAccessToken)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::audit::AuditMetadata;

    use super::*;

    fn user() -> UserRecord {
        UserRecord {
            uuid: UserUuid::new(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            audit: AuditMetadata::now(),
        }
    }

    #[test]
    fn issued_token_verifies_with_claims() -> TestResult {
        let signer = AccessTokenSigner::new(b"secret", SignedDuration::from_mins(15));
        let user = user();

        let (token, expires_at) = signer.issue(&user, vec!["student".to_string()])?;
        let claims = signer.verify(&token)?;

        assert_eq!(claims.user(), user.uuid);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name, "Ada Lovelace");
        assert_eq!(claims.roles, vec!["student".to_string()]);
        assert_eq!(claims.exp, expires_at.as_second());

        Ok(())
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() -> TestResult {
        let signer = AccessTokenSigner::new(b"secret", SignedDuration::from_mins(15));
        let forger = AccessTokenSigner::new(b"not-the-secret", SignedDuration::from_mins(15));

        let (token, _) = forger.issue(&user(), Vec::new())?;

        assert!(matches!(
            signer.verify(&token),
            Err(SessionsServiceError::InvalidAccessToken)
        ));

        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> TestResult {
        let signer = AccessTokenSigner::new(b"secret", SignedDuration::from_mins(-1));

        let (token, _) = signer.issue(&user(), Vec::new())?;

        assert!(matches!(
            signer.verify(&token),
            Err(SessionsServiceError::InvalidAccessToken)
        ));

        Ok(())
    }

    #[test]
    fn garbage_is_rejected() {
        let signer = AccessTokenSigner::new(b"secret", SignedDuration::from_mins(15));

        assert!(matches!(
            signer.verify("not.a.jwt"),
            Err(SessionsServiceError::InvalidAccessToken)
        ));
    }
}
