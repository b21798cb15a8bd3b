use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header, errors::ErrorKind, jwk::JwkSet,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, sync::Arc};

use crate::{config::AppConfig, error::ApiError};

// --- Permission Strings ---

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Claims
///
/// The fixed record a verified token is decoded into. Registered claims (`aud`,
/// `iss`, `exp`) are checked by `jsonwebtoken` during verification; the
/// remaining fields are what the guard itself inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the issuer's identifier for the caller.
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration Time (exp).
    pub exp: u64,
    /// The scopes granted to the caller. `None` when the issuer did not include
    /// the claim at all, which is distinct from an empty grant.
    #[serde(default)]
    pub permissions: Option<BTreeSet<String>>,
}

/// AuthErrorCode
///
/// The machine-readable failure kinds produced by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    MissingHeader,
    InvalidHeader,
    TokenExpired,
    InvalidClaims,
    Unauthorized,
    KeySetUnavailable,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::MissingHeader => "missing_header",
            AuthErrorCode::InvalidHeader => "invalid_header",
            AuthErrorCode::TokenExpired => "token_expired",
            AuthErrorCode::InvalidClaims => "invalid_claims",
            AuthErrorCode::Unauthorized => "unauthorized",
            AuthErrorCode::KeySetUnavailable => "key_set_unavailable",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AuthError
///
/// A single failure type carrying its own status code and human-readable
/// description. The HTTP envelope is built from these two fields alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub status: StatusCode,
    pub description: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            code,
            status,
            description: description.into(),
        }
    }

    fn unauthorized(code: AuthErrorCode, description: &str) -> Self {
        Self::new(code, StatusCode::UNAUTHORIZED, description)
    }
}

// --- Key Sources ---

/// KeySource
///
/// Supplies the issuer's current signing-key set. The guard asks for it on every
/// authorization; implementations decide where the keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn key_set(&self) -> Result<JwkSet, AuthError>;
}

/// RemoteKeySource
///
/// Fetches the issuer's published JWKS document over HTTPS.
pub struct RemoteKeySource {
    client: reqwest::Client,
    url: String,
}

impl RemoteKeySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl KeySource for RemoteKeySource {
    async fn key_set(&self) -> Result<JwkSet, AuthError> {
        let unavailable = |e: reqwest::Error| {
            tracing::error!(url = %self.url, "failed to fetch signing keys: {:?}", e);
            AuthError::new(
                AuthErrorCode::KeySetUnavailable,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to fetch the signing keys",
            )
        };

        self.client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unavailable)?
            .json::<JwkSet>()
            .await
            .map_err(unavailable)
    }
}

/// StaticKeySource
///
/// A fixed key set, for tests and for deployments that pin the issuer's keys.
pub struct StaticKeySource {
    keys: JwkSet,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn key_set(&self) -> Result<JwkSet, AuthError> {
        Ok(self.keys.clone())
    }
}

// --- Guard ---

/// AccessGuard
///
/// Verifies bearer tokens against the issuer's key set and checks permission
/// membership. Holds no per-request state, so one instance is shared by every route.
#[derive(Clone)]
pub struct AccessGuard {
    keys: Arc<dyn KeySource>,
    audience: String,
    issuer: String,
}

impl AccessGuard {
    pub fn new(keys: Arc<dyn KeySource>, audience: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            keys,
            audience: audience.into(),
            issuer: issuer.into(),
        }
    }

    /// Builds a guard for the configured issuer, fetching keys from its JWKS endpoint.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(RemoteKeySource::new(config.jwks_url())),
            config.api_audience.clone(),
            config.issuer(),
        )
    }

    /// authorize
    ///
    /// Runs the full check for one request: header shape, key lookup, signature
    /// and registered-claim verification, then permission membership.
    pub async fn authorize(&self, headers: &HeaderMap, permission: &str) -> Result<Claims, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.verify(token).await?;
        check_permission(&claims, permission)?;
        Ok(claims)
    }

    /// verify
    ///
    /// Decodes and verifies a raw token, returning its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| {
            AuthError::unauthorized(AuthErrorCode::InvalidHeader, "Unable to parse authentication token")
        })?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::unauthorized(AuthErrorCode::InvalidHeader, "Authorization malformed"))?;

        let key_set = self.keys.key_set().await?;
        let key = key_set
            .find(&kid)
            .and_then(|jwk| DecodingKey::from_jwk(jwk).ok())
            .ok_or_else(|| {
                AuthError::unauthorized(AuthErrorCode::InvalidHeader, "Unable to find the appropriate key")
            })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        // Without this, a token lacking `aud` or `iss` skips those checks.
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        match decode::<Claims>(token, &key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => Err(match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AuthError::unauthorized(AuthErrorCode::TokenExpired, "Token expired")
                }
                ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => incorrect_claims(),
                ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
                    incorrect_claims()
                }
                _ => AuthError::unauthorized(
                    AuthErrorCode::InvalidHeader,
                    "Unable to parse authentication token",
                ),
            }),
        }
    }
}

fn incorrect_claims() -> AuthError {
    AuthError::unauthorized(
        AuthErrorCode::InvalidClaims,
        "Incorrect claims, check the audience and issuer",
    )
}

/// bearer_token
///
/// Extracts the raw token from `Authorization: Bearer <token>`. The header must
/// split on spaces into exactly two parts, the first being literally `Bearer`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AuthError::unauthorized(AuthErrorCode::MissingHeader, "Authorization header is expected"))?
        .to_str()
        .map_err(|_| AuthError::unauthorized(AuthErrorCode::InvalidHeader, "Authorization header is not valid text"))?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        ["Bearer"] | ["Bearer", _] => Err(AuthError::unauthorized(AuthErrorCode::InvalidHeader, "Token not found")),
        [scheme, ..] if *scheme != "Bearer" => Err(AuthError::unauthorized(
            AuthErrorCode::InvalidHeader,
            "Authorization header must start with \"Bearer\"",
        )),
        _ => Err(AuthError::unauthorized(
            AuthErrorCode::InvalidHeader,
            "Authorization header must be bearer token",
        )),
    }
}

/// check_permission
pub fn check_permission(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or_else(|| AuthError::unauthorized(AuthErrorCode::InvalidClaims, "Permissions not included in JWT"))?;

    if granted.contains(permission) {
        Ok(())
    } else {
        Err(AuthError::unauthorized(AuthErrorCode::Unauthorized, "Permission not found"))
    }
}

// --- Middleware ---

/// PermissionGate
///
/// Middleware state binding the shared guard to the one permission a route requires.
#[derive(Clone)]
pub struct PermissionGate {
    pub guard: AccessGuard,
    pub permission: &'static str,
}

impl PermissionGate {
    pub fn new(guard: AccessGuard, permission: &'static str) -> Self {
        Self { guard, permission }
    }
}

/// require_permission
///
/// Axum middleware composed in front of each protected route. The request is
/// passed through untouched when the caller holds the gate's permission;
/// otherwise the guard's failure is rendered as the error envelope and the
/// handler never runs.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let outcome = gate.guard.authorize(request.headers(), gate.permission).await;
    match outcome {
        Ok(claims) => {
            tracing::debug!(
                sub = claims.sub.as_deref().unwrap_or("unknown"),
                permission = gate.permission,
                "request authorized"
            );
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(code = %e.code, permission = gate.permission, "authorization failed: {}", e.description);
            Err(ApiError::Auth(e))
        }
    }
}
