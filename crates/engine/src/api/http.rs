//! HTTP routes: health probe and credential issuance.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use hexrealm_shared::{AuthRequest, AuthResponse};

use crate::app::App;
use crate::use_cases::AuthError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

async fn health() -> &'static str {
    "OK"
}

async fn signup(
    State(app): State<Arc<App>>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = body?;
    Ok(Json(app.use_cases.auth.signup(&request).await?))
}

async fn login(
    State(app): State<Arc<App>>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = body?;
    Ok(Json(app.use_cases.auth.login(&request).await?))
}

/// Auth failures rendered as `{success: false, error}` with a matching status.
#[derive(Debug)]
pub struct ApiError(AuthError);

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError(e)
    }
}

/// Malformed or incomplete bodies are validation failures, not axum's plain-text 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected auth body");
        ApiError(AuthError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            AuthError::HandleTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Hashing(_) | AuthError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Auth request failed");
            "Internal error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(AuthResponse::failed(message))).into_response()
    }
}
