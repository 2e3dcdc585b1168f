//! HS256 token signing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use budgetdesk_core::config::AuthConfig;
use budgetdesk_core::error::AppError;
use budgetdesk_core::result::AppResult;

use super::claims::{Claims, TokenPayload};

/// Clock skew tolerated when checking expiry, in seconds.
const LEEWAY_SECONDS: u64 = 5;

/// A signed token and the moment it stops being valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The encoded JWT.
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Client and server tokens issued together at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token handed to the client application.
    pub client_token: String,
    /// Long-lived token kept in an HTTP-only cookie.
    pub server_token: String,
    /// Client token expiration timestamp.
    pub client_expires_at: DateTime<Utc>,
    /// Server token expiration timestamp.
    pub server_expires_at: DateTime<Utc>,
}

/// Signs, verifies and decodes tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Verifying validation: signature, algorithm and expiry.
    validation: Validation,
    /// Parse-only validation used by [`TokenCodec::decode`].
    unverified: Validation,
    /// Client token lifetime.
    client_ttl: Duration,
    /// Server token lifetime.
    server_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("client_ttl", &self.client_ttl)
            .field("server_ttl", &self.server_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    ///
    /// Fails with a configuration error when no signing secret is set.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        if config.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("JWT secret is not configured"));
        }

        let client_ttl = Duration::from_std(config.client_token_ttl())
            .map_err(|_| AppError::configuration("Client token TTL is out of range"))?;
        let server_ttl = Duration::from_std(config.server_token_ttl())
            .map_err(|_| AppError::configuration("Server token TTL is out of range"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = LEEWAY_SECONDS;

        let mut unverified = Validation::new(Algorithm::HS256);
        unverified.insecure_disable_signature_validation();
        unverified.validate_exp = false;
        unverified.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            unverified,
            client_ttl,
            server_ttl,
        })
    }

    /// Signs `payload` into a token valid for `ttl`.
    pub fn sign(&self, payload: &TokenPayload, ttl: Duration) -> AppResult<String> {
        self.issue(payload, ttl).map(|issued| issued.token)
    }

    /// Verifies signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid token signature")
                }
                _ => AppError::unauthorized("Invalid token"),
            })
    }

    /// Reads the claims without checking signature or expiry.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.unverified)
            .ok()
            .map(|data| data.claims)
    }

    /// Issues a client token.
    pub fn issue_client(&self, payload: &TokenPayload) -> AppResult<IssuedToken> {
        self.issue(payload, self.client_ttl)
    }

    /// Issues a server token.
    pub fn issue_server(&self, payload: &TokenPayload) -> AppResult<IssuedToken> {
        self.issue(payload, self.server_ttl)
    }

    /// Issues the client and server tokens for one payload.
    pub fn issue_pair(&self, payload: &TokenPayload) -> AppResult<TokenPair> {
        let client = self.issue_client(payload)?;
        let server = self.issue_server(payload)?;
        Ok(TokenPair {
            client_token: client.token,
            server_token: server.token,
            client_expires_at: client.expires_at,
            server_expires_at: server.expires_at,
        })
    }

    fn issue(&self, payload: &TokenPayload, ttl: Duration) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            id: payload.id,
            username: payload.username.clone(),
            role: payload.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }
}
