//! JSON Web Token issuing and verification.
//!
//! # Responsibilities
//! - Issue HMAC-signed tokens carrying an `exp` claim
//! - Verify tokens presented in the `Authorization` header
//!
//! # Design Decisions
//! - Only the HMAC family is supported; the key is the shared secret
//! - Any decode, signature or expiry failure yields no claims, never an error
//!   response of its own; handlers decide via `authenticated()`

use std::str::FromStr;

use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::security::access_control::TokenVerifier;

/// Algorithm names accepted in `auth.jwt_algorithm`.
pub const SUPPORTED_JWT_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

/// Errors building a codec or signing a token.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Unsupported JWT algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("auth.secret_key is empty")]
    MissingSecret,

    #[error("Failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies tokens with the configured secret.
#[derive(Clone)]
pub struct JwtCodec {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in: u64,
    leeway: u64,
}

impl JwtCodec {
    pub fn new(secret: &[u8], algorithm: &str) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }
        if !SUPPORTED_JWT_ALGORITHMS.contains(&algorithm) {
            return Err(JwtError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;
        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expires_in: AuthConfig::default().jwt_expiration_secs,
            leeway: 0,
        })
    }

    /// Codec configured from the `[auth]` settings section.
    pub fn from_config(config: &AuthConfig) -> Result<Self, JwtError> {
        Ok(Self::new(config.secret_key.as_bytes(), &config.jwt_algorithm)?
            .with_expiration(config.jwt_expiration_secs)
            .with_leeway(config.jwt_leeway_secs))
    }

    pub fn with_expiration(mut self, secs: u64) -> Self {
        self.expires_in = secs;
        self
    }

    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway = secs;
        self
    }

    /// Sign `payload` with an `exp` of now plus the configured lifetime.
    pub fn generate(&self, payload: Map<String, Value>) -> Result<String, JwtError> {
        self.generate_expiring(payload, self.expires_in as i64)
    }

    /// Sign `payload` expiring `expires_in` seconds from now (negative for
    /// a token that is already expired).
    pub fn generate_expiring(
        &self,
        mut payload: Map<String, Value>,
        expires_in: i64,
    ) -> Result<String, JwtError> {
        let exp = get_current_timestamp() as i64 + expires_in;
        payload.insert("exp".to_string(), Value::from(exp));
        Ok(encode(&Header::new(self.algorithm), &payload, &self.encoding)?)
    }

    /// Claims of a valid token, `None` otherwise.
    ///
    /// With `verify_exp` off, expired tokens still decode.
    pub fn parse(&self, token: &str, verify_exp: bool) -> Option<Value> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway;
        validation.validate_exp = verify_exp;
        if !verify_exp {
            validation.required_spec_claims.clear();
        }

        match decode::<Value>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected token");
                None
            }
        }
    }
}

impl TokenVerifier for JwtCodec {
    fn verify(&self, token: &str) -> Option<Value> {
        self.parse(token, true)
    }
}
