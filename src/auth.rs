use actix_web::{dev::Payload, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use std::future::{ready, Ready};
use tracing::{debug, error};

use crate::error::ApiError;

pub const MISSING_TOKEN_MESSAGE: &str = "Missing authentication";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";

/// `sub` is the user id injected into payloads as `owner` / `userId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub username: String,
    pub exp: usize,
}

fn secret() -> Result<String, ApiError> {
    env::var("JWT_SECRET").map_err(|_| {
        error!("JWT_SECRET not set");
        ApiError::Internal
    })
}

/// Validate a JWT and return its claims.
fn decode_jwt(token: &str) -> Result<Claims, ApiError> {
    let secret = secret()?;
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.into())
        })
}

/// Extractor yielding validated `Claims`.
pub struct Auth(pub Claims);

impl Auth {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }
}

impl FromRequest for Auth {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        // Delegate to BearerAuth to parse the header.
        let result = match BearerAuth::from_request(req, pl).into_inner() {
            Ok(bearer) => decode_jwt(bearer.token()).map(Auth),
            Err(_) => Err(ApiError::Unauthorized(MISSING_TOKEN_MESSAGE.into())),
        };
        ready(result)
    }
}

/// Issue a token for `user_id`, valid for 24 hours.
pub fn create_jwt(user_id: &str, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = env::var("JWT_SECRET").map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidKeyFormat)?;
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(24)).timestamp() as usize;

    let claims = Claims { sub: user_id.to_string(), username: username.to_string(), exp: expiration };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}
