//! Bearer token issuance and validation.
//!
//! Tokens are compact JWS strings (`header.payload.signature`, each segment
//! base64url without padding) signed with HMAC-SHA256 over a shared secret.
//! The payload carries the caller's email, the issuer and the issue/expiry
//! instants as unix seconds.
//!
//! ```
//! use rolodex::{TokenConfig, TokenService};
//!
//! let tokens = TokenService::new(TokenConfig::default());
//! let token = tokens.issue("ana@x.com").unwrap();
//! let claims = tokens.validate(&token).unwrap();
//! assert_eq!(claims.email, "ana@x.com");
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Signing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Shared HMAC secret.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// How long an issued token stays valid, in hours.
    #[serde(default = "default_lifetime_hours")]
    pub lifetime_hours: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            issuer: default_issuer(),
            lifetime_hours: default_lifetime_hours(),
        }
    }
}

fn default_secret() -> String {
    "esfsdfkpskodkf234234243243".to_string()
}

fn default_issuer() -> String {
    "admin".to_string()
}

fn default_lifetime_hours() -> u32 {
    48
}

/// Decoded payload of a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iss: String,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expires at, unix seconds.
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

/// Issues and validates signed, time-limited identity tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a token for `email` valid from now for the configured lifetime.
    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, Utc::now())
    }

    /// Issue a token as if the current instant were `now`.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires = Duration::try_hours(i64::from(self.config.lifetime_hours))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                TokenError::Signing(format!(
                    "lifetime of {}h overflows the expiry timestamp",
                    self.config.lifetime_hours
                ))
            })?;
        let claims = Claims {
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };

        let header = serde_json::to_vec(&header).map_err(|e| TokenError::Signing(e.to_string()))?;
        let payload = serde_json::to_vec(&claims).map_err(|e| TokenError::Signing(e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&signing_input)?);

        debug!(email, exp = claims.exp, "issued token");
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Validate `token` against the current instant.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` as if the current instant were `now`.
    ///
    /// The structure and signature are checked before the claims are decoded,
    /// so a claim error always means the token was genuinely ours.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (header, payload, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => {
                    return Err(TokenError::Malformed(
                        "expected three dot-separated segments".to_string(),
                    ))
                }
            };

        let signing_input = &token[..header.len() + 1 + payload.len()];

        let header_bytes = decode_segment(header, "header")?;
        let header: Header = serde_json::from_slice(&header_bytes)
            .map_err(|e| TokenError::Malformed(format!("header: {e}")))?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed(format!(
                "unexpected signing method {}",
                header.alg
            )));
        }

        let signature = decode_segment(signature, "signature")?;
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Malformed("signature is invalid".to_string()))?;

        let payload = decode_segment(payload, "payload")?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|e| TokenError::ClaimDecode(e.to_string()))?;

        if claims.exp < now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn sign(&self, signing_input: &str) -> Result<Vec<u8>, TokenError> {
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("{what}: {e}")))
}
