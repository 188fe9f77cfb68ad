use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seatline_core::validation;
use seatline_shared::models::{Role, User};
use seatline_shared::pii::Masked;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: Masked<String>,
    confirm_password: Masked<String>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: Masked<String>,
}

#[derive(Debug, Serialize)]
struct UserProfile {
    id: Uuid,
    name: String,
    email: String,
    role: Role,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: UserProfile,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    validation::validate_name(&req.name).map_err(|e| AppError::ValidationError(e.to_string()))?;
    validation::validate_email(&req.email).map_err(|e| AppError::ValidationError(e.to_string()))?;
    validation::validate_password(req.password.expose())
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if req.password.expose() != req.confirm_password.expose() {
        return Err(AppError::ValidationError(
            "password and confirmation do not match".to_string(),
        ));
    }

    let existing = state
        .users
        .find_by_email(&req.email)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if existing.is_some() {
        return Err(AppError::ConflictError("email already exists".to_string()));
    }

    let password_hash = bcrypt::hash(req.password.expose(), bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))?;

    let user = User::new(req.name, req.email, password_hash);
    state
        .users
        .create_user(&user)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id: user.id })))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validation::validate_email(&req.email).map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = state
        .users
        .find_by_email(&req.email)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::AuthenticationError("unknown email or password".to_string()))?;

    let matches = bcrypt::verify(req.password.expose(), &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {}", e)))?;
    if !matches {
        return Err(AppError::AuthenticationError(
            "unknown email or password".to_string(),
        ));
    }

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    tracing::info!(user_id = %user.id, "Login successful");

    Ok(Json(LoginResponse {
        token,
        user: UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}
