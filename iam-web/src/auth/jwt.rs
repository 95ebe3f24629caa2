//! HS256 access tokens

use iam_core::{IamError, IamResult, TokenCodec, UserId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token body. Tokens carry no expiry and stay valid until the secret changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,
}

/// Signing and verification keys derived from one shared secret
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &[u8]) -> Self {
        // Only HS256 is accepted; the header's `alg` is never trusted
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for JwtCodec {
    fn issue(&self, user_id: UserId) -> IamResult<String> {
        let claims = Claims { id: user_id.get() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| IamError::internal(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str) -> IamResult<UserId> {
        if token.is_empty() {
            return Err(IamError::InvalidToken);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            IamError::InvalidToken
        })?;

        Ok(UserId(data.claims.id))
    }
}
