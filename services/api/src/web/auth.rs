//! services/api/src/web/auth.rs
//!
//! Bearer token validation against the identity provider's signing keys.
//!
//! Tokens are checked for signature, issuer, audience, `exp` and `nbf`, with a
//! five minute allowance for clock skew. The decoded claims become the
//! caller's `IdentityClaims`.

use axum::http::{header, HeaderMap};
use househeroes_core::claims::IdentityClaims;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use tracing::{debug, info};

use crate::config::{AuthConfig, SigningKeySource};

/// Allowed clock skew, in seconds, when checking `exp` and `nbf`.
pub const CLOCK_SKEW_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("No signing key matches the token")]
    UnknownKey,
    #[error("Failed to load signing keys: {0}")]
    KeyLoad(String),
}

struct VerificationKey {
    kid: Option<String>,
    key: DecodingKey,
    algorithm: Algorithm,
}

/// Validates bearer tokens issued for this application.
pub struct TokenVerifier {
    keys: Vec<VerificationKey>,
    issuer: String,
    audience: String,
}

impl TokenVerifier {
    /// Loads the signing keys named by the configuration. A JWKS URL is
    /// fetched once at startup.
    pub async fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let issuer = config.issuer.as_str();
        let audience = config.audience.as_str();
        match &config.signing_key {
            SigningKeySource::JwksPath(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| AuthError::KeyLoad(format!("{}: {}", path.display(), e)))?;
                let set: JwkSet =
                    serde_json::from_str(&raw).map_err(|e| AuthError::KeyLoad(e.to_string()))?;
                Self::from_jwks(&set, issuer, audience)
            }
            SigningKeySource::JwksUrl(url) => {
                info!("Fetching signing keys from {}", url);
                let set = reqwest::get(url)
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| AuthError::KeyLoad(e.to_string()))?
                    .json::<JwkSet>()
                    .await
                    .map_err(|e| AuthError::KeyLoad(e.to_string()))?;
                Self::from_jwks(&set, issuer, audience)
            }
            SigningKeySource::RsaPublicKeyPem(pem) => {
                Self::from_rsa_pem(pem.as_bytes(), issuer, audience)
            }
            SigningKeySource::HmacSecret(secret) => {
                Ok(Self::from_hmac_secret(secret.as_bytes(), issuer, audience))
            }
        }
    }

    pub fn from_hmac_secret(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self::with_keys(
            vec![VerificationKey {
                kid: None,
                key: DecodingKey::from_secret(secret),
                algorithm: Algorithm::HS256,
            }],
            issuer,
            audience,
        )
    }

    pub fn from_rsa_pem(pem: &[u8], issuer: &str, audience: &str) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(|e| AuthError::KeyLoad(e.to_string()))?;
        Ok(Self::with_keys(
            vec![VerificationKey {
                kid: None,
                key,
                algorithm: Algorithm::RS256,
            }],
            issuer,
            audience,
        ))
    }

    /// Keeps the RSA and EC keys of the set; others are skipped.
    pub fn from_jwks(set: &JwkSet, issuer: &str, audience: &str) -> Result<Self, AuthError> {
        let keys: Vec<VerificationKey> = set
            .keys
            .iter()
            .filter_map(|jwk| {
                let algorithm = match &jwk.algorithm {
                    AlgorithmParameters::RSA(_) => Algorithm::RS256,
                    AlgorithmParameters::EllipticCurve(_) => Algorithm::ES256,
                    _ => return None,
                };
                let key = DecodingKey::from_jwk(jwk).ok()?;
                Some(VerificationKey {
                    kid: jwk.common.key_id.clone(),
                    key,
                    algorithm,
                })
            })
            .collect();
        if keys.is_empty() {
            return Err(AuthError::KeyLoad("the key set has no usable keys".to_string()));
        }
        info!("Loaded {} signing key(s)", keys.len());
        Ok(Self::with_keys(keys, issuer, audience))
    }

    fn with_keys(keys: Vec<VerificationKey>, issuer: &str, audience: &str) -> Self {
        Self {
            keys,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Checks the token and returns its identity claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let key = self.select_key(&header)?;

        let mut validation = Validation::new(key.algorithm);
        validation.leeway = CLOCK_SKEW_SECS;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<IdentityClaims>(token, &key.key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(data.claims)
    }

    fn select_key(&self, header: &Header) -> Result<&VerificationKey, AuthError> {
        let mut candidates = self.keys.iter().filter(|k| k.algorithm == header.alg);
        let found = match &header.kid {
            Some(kid) => candidates.find(|k| k.kid.is_none() || k.kid.as_deref() == Some(kid)),
            None => candidates.next(),
        };
        found.ok_or_else(|| {
            debug!("No key for alg {:?} kid {:?}", header.alg, header.kid);
            AuthError::UnknownKey
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey};
    use rstest::{fixture, rstest};
    use serde_json::json;

    const SECRET: &[u8] = b"househeroes-test-secret";
    const ISSUER: &str = "https://login.example.com/tenant/v2.0";
    const AUDIENCE: &str = "househeroes-client";

    #[fixture]
    fn verifier() -> TokenVerifier {
        TokenVerifier::from_hmac_secret(SECRET, ISSUER, AUDIENCE)
    }

    fn token(iss: &str, aud: &str, exp_offset_secs: i64) -> String {
        let claims = json!({
            "sub": "entra-user-1",
            "email": "sarah.paquin@email.com",
            "given_name": "Sarah",
            "family_name": "Paquin",
            "iss": iss,
            "aud": aud,
            "exp": Utc::now().timestamp() + exp_offset_secs,
        });
        let key = EncodingKey::from_secret(SECRET);
        encode(&jsonwebtoken::Header::default(), &claims, &key).unwrap()
    }

    #[rstest]
    fn accepts_a_well_formed_token(verifier: TokenVerifier) {
        let claims = verifier.verify(&token(ISSUER, AUDIENCE, 3600)).unwrap();
        assert_eq!(claims.external_id().unwrap(), "entra-user-1");
        assert_eq!(claims.first_name(), "Sarah");
        assert_eq!(claims.last_name(), "Paquin");
    }

    #[rstest]
    fn tolerates_expiry_within_the_skew(verifier: TokenVerifier) {
        assert!(verifier.verify(&token(ISSUER, AUDIENCE, -120)).is_ok());
    }

    #[rstest]
    #[case::wrong_audience(ISSUER, "someone-else", 3600)]
    #[case::wrong_issuer("https://evil.example.com", AUDIENCE, 3600)]
    #[case::expired(ISSUER, AUDIENCE, -(CLOCK_SKEW_SECS as i64) - 60)]
    fn rejects_invalid_tokens(
        verifier: TokenVerifier,
        #[case] iss: &str,
        #[case] aud: &str,
        #[case] exp_offset: i64,
    ) {
        let result = verifier.verify(&token(iss, aud, exp_offset));
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[rstest]
    fn rejects_a_token_signed_with_another_secret() {
        let other = TokenVerifier::from_hmac_secret(b"another-secret", ISSUER, AUDIENCE);
        assert!(other.verify(&token(ISSUER, AUDIENCE, 3600)).is_err());
    }

    #[rstest]
    fn rejects_garbage(verifier: TokenVerifier) {
        assert!(matches!(verifier.verify("not-a-jwt"), Err(AuthError::InvalidToken(_))));
    }

    #[rstest]
    #[case("Bearer abc.def.ghi", Some("abc.def.ghi"))]
    #[case("bearer abc", Some("abc"))]
    #[case("Basic dXNlcjpwYXNz", None)]
    #[case("Bearer ", None)]
    fn parses_bearer_headers(#[case] value: &str, #[case] expected: Option<&str>) {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        assert_eq!(bearer_token(&headers), expected);
    }

    #[test]
    fn missing_header_yields_no_token() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
