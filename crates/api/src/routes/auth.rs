//! Authentication routes for login, register, token refresh, and logout.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::error::ApiError;
use faktura_core::auth::{hash_password, verify_password};
use faktura_db::{SessionRepository, UserRepository};
use faktura_shared::auth::{
    LoginRequest, LoginResponse, LogoutRequest, MembershipInfo, RefreshRequest, RegisterRequest,
    UserInfo,
};
use faktura_shared::{AppError, JwtError};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

fn invalid_credentials() -> ApiError {
    ApiError(AppError::Unauthenticated(
        "Invalid email or password".to_string(),
    ))
}

/// POST /auth/login - Authenticate a user and return tokens.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo.find_by_email(&payload.email).await? else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials());
    };

    if !user.is_active {
        return Err(ApiError(AppError::Unauthenticated(
            "This account has been disabled".to_string(),
        )));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials());
    }

    // A user without an organization can still log in; document routes will
    // resolve to NoOrganization until they create or join one.
    let organization = user_repo
        .get_membership(user.id)
        .await?
        .map(|(membership, org)| MembershipInfo {
            id: org.id,
            name: org.name,
            slug: org.slug,
            role: crate::routes::organizations::role_to_string(&membership.role),
        });

    let access_token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            ApiError(AppError::Internal("token generation failed".to_string()))
        })?;
    let refresh_token = state
        .jwt_service
        .generate_refresh_token(user.id)
        .map_err(|e| {
            error!(error = %e, "Failed to generate refresh token");
            ApiError(AppError::Internal("token generation failed".to_string()))
        })?;

    let session_repo = SessionRepository::new((*state.db).clone());
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string);
    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    session_repo
        .create(user.id, &refresh_token, expires_at, user_agent, None)
        .await?;

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            organization,
        },
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());

    if payload.password.len() < 8 {
        return Err(ApiError(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        )));
    }

    if user_repo.email_exists(&payload.email).await? {
        return Err(ApiError(AppError::AlreadyExists(
            "An account with this email already exists".to_string(),
        )));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = user_repo
        .create(&payload.email, &password_hash, &payload.full_name)
        .await?;

    info!(user_id = %user.id, email = %user.email, "New user registered");

    // No tokens yet: the user creates or joins an organization first.
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": {
                "id": user.id,
                "email": user.email,
                "full_name": user.full_name
            },
            "message": "Registration successful. Please create or join an organization."
        })),
    )
        .into_response())
}

/// POST /auth/refresh - Refresh the access token using a refresh token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Response, ApiError> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|e| {
            let message = match e {
                JwtError::Expired => "Refresh token has expired",
                _ => "Invalid refresh token",
            };
            ApiError(AppError::Unauthenticated(message.to_string()))
        })?;

    let session_repo = SessionRepository::new((*state.db).clone());
    if session_repo
        .find_active(&payload.refresh_token)
        .await?
        .is_none()
    {
        return Err(ApiError(AppError::Unauthenticated(
            "Session has been revoked".to_string(),
        )));
    }

    let access_token = state
        .jwt_service
        .generate_access_token(claims.user_id())
        .map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            ApiError(AppError::Internal("token generation failed".to_string()))
        })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "access_token": access_token,
            "expires_in": state.jwt_service.access_token_expires_in()
        })),
    )
        .into_response())
}

/// POST /auth/logout - Invalidate a refresh token.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> Result<Response, ApiError> {
    let session_repo = SessionRepository::new((*state.db).clone());
    session_repo.revoke(&payload.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
