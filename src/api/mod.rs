//! API handlers for Atelier REST endpoints

pub mod clients;
pub mod health;
pub mod interventions;
pub mod loaners;
pub mod loans;
pub mod openapi;
pub mod parts;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, AppState};

/// Session claims issued by the external auth layer; this server trusts
/// them and only needs the acting technician's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianClaims {
    pub sub: String,
    pub technician_id: i32,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl TechnicianClaims {
    /// Create a session token (used by the auth collaborator and by tests)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a session token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// Extractor for the authenticated technician from the session token
pub struct AuthenticatedTechnician(pub TechnicianClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedTechnician {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication("Invalid authorization header format".to_string()));
        }

        let token = &auth_header[7..];

        let claims = TechnicianClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedTechnician(claims))
    }
}
