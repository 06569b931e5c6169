//! Stateless bearer-token issue and verification.
//!
//! Tokens are `header.payload.signature`: two canonical-JSON segments and an
//! HMAC-SHA256 signature over them, each base64url-encoded without padding.
//! Nothing is persisted server-side; expiry rides inside the payload.

#![forbid(unsafe_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tableside_core::stable_json_bytes;

pub const CRATE_NAME: &str = "tableside-auth";

const TOKEN_TYPE: &str = "TST";
pub const DEFAULT_ALGORITHM: &str = "HS256";
pub const DEFAULT_TTL_SECS: u64 = 3600;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthErrorCode {
    MalformedToken,
    UnsupportedAlgorithm,
    BadSignature,
    Expired,
    MissingCredential,
    Internal,
}

impl AuthErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedToken => "malformed_token",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::MissingCredential => "missing_credential",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    #[must_use]
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AuthError {}

/// Process-wide token configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub algorithm: String,
    pub ttl: Duration,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            algorithm: DEFAULT_ALGORITHM.to_string(),
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Decoded token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub login: String,
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Issues a signed token for a subject/login pair.
    pub fn issue(&self, subject_id: i64, login: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject_id.to_string(),
            login: login.to_string(),
            iat: now,
            exp: Some(now + self.config.ttl.as_secs() as i64),
        };
        self.issue_claims(&claims)
    }

    fn issue_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = TokenHeader {
            alg: self.config.algorithm.clone(),
            typ: TOKEN_TYPE.to_string(),
        };
        let header_bytes = stable_json_bytes(&header)
            .map_err(|e| AuthError::new(AuthErrorCode::Internal, e.to_string()))?;
        let payload_bytes = stable_json_bytes(claims)
            .map_err(|e| AuthError::new(AuthErrorCode::Internal, e.to_string()))?;

        let header_part = URL_SAFE_NO_PAD.encode(header_bytes);
        let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);
        let signing_input = format!("{header_part}.{payload_part}");
        let signature = self.sign(signing_input.as_bytes())?;
        let sig_part = URL_SAFE_NO_PAD.encode(signature);

        Ok(format!("{signing_input}.{sig_part}"))
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header_part, payload_part, sig_part] = parts.as_slice() else {
            return Err(AuthError::new(
                AuthErrorCode::MalformedToken,
                "token must have exactly 3 segments",
            ));
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_part)
            .map_err(|e| AuthError::new(AuthErrorCode::MalformedToken, e.to_string()))?;
        let header: TokenHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| AuthError::new(AuthErrorCode::MalformedToken, e.to_string()))?;
        if header.alg != self.config.algorithm {
            return Err(AuthError::new(
                AuthErrorCode::UnsupportedAlgorithm,
                format!("unsupported algorithm: {}", header.alg),
            ));
        }

        let signing_input = format!("{header_part}.{payload_part}");
        let expected = self.sign(signing_input.as_bytes())?;
        // Any corruption of the signature segment reads as a bad signature,
        // including bytes that no longer decode as base64url.
        let presented = URL_SAFE_NO_PAD.decode(sig_part).map_err(|_| {
            AuthError::new(AuthErrorCode::BadSignature, "signature mismatch")
        })?;
        if expected.as_slice().ct_eq(presented.as_slice()).unwrap_u8() != 1 {
            return Err(AuthError::new(
                AuthErrorCode::BadSignature,
                "signature mismatch",
            ));
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|e| AuthError::new(AuthErrorCode::MalformedToken, e.to_string()))?;
        let claims: Claims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| AuthError::new(AuthErrorCode::MalformedToken, e.to_string()))?;

        if let Some(exp) = claims.exp {
            if Utc::now().timestamp() >= exp {
                return Err(AuthError::new(AuthErrorCode::Expired, "token expired"));
            }
        }

        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Result<[u8; 32], AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|e| AuthError::new(AuthErrorCode::Internal, e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let raw = header.ok_or_else(|| {
        AuthError::new(AuthErrorCode::MissingCredential, "Missing Bearer token")
    })?;
    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::new(
            AuthErrorCode::MissingCredential,
            "Missing Bearer token",
        )),
    }
}
