use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Access tokens are deliberately short-lived; clients are expected to
/// refresh via their session token.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60;

/// Claims carried by an access token. Validity is signature + expiry only;
/// guards re-resolve the user and trust these claims just for `sub`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        TokenIssuer {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(ACCESS_TOKEN_TTL_SECS),
        }
    }

    pub fn issue_access_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Default leeway is 60s, which would double the effective lifetime
        validation.leeway = 0;

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }

    /// 64 random bytes, hex-encoded: an unguessable bearer credential with
    /// no embedded structure.
    pub fn generate_session_token() -> String {
        let mut bytes = [0u8; 64];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
