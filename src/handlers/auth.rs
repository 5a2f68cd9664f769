// Account handlers: sign-up and login

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    db::NewUser,
    db::RepoError,
    error::{AppError, InternalResultExt},
    handlers::scalar_field,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    user_name: Option<Value>,
    mail: Option<Value>,
    tel: Option<Value>,
    user_password: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    user_name: Option<String>,
    user_password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    status: &'static str,
    inserted_id: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    status: &'static str,
    message: &'static str,
    token: String,
}

const BAD_CREDENTIALS: &str = "invalid user name or password";

// POST /sign-up - Register a new account
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(form) = payload?;

    let user = state
        .users
        .create(NewUser {
            user_name: scalar_field(form.user_name),
            mail: scalar_field(form.mail),
            tel: scalar_field(form.tel),
            password: scalar_field(form.user_password),
        })
        .await
        .inspect_err(|e| match e {
            RepoError::Conflict(field) => tracing::info!(%field, "sign-up rejected: already exists"),
            RepoError::MissingFields => tracing::info!("sign-up rejected: missing fields"),
            _ => {}
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            status: "ok",
            inserted_id: user.id,
        }),
    ))
}

// POST /login - Exchange credentials for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(form) = payload?;

    let (Some(user_name), Some(password)) = (
        form.user_name.filter(|n| !n.trim().is_empty()),
        form.user_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest("missing required fields".to_string()));
    };

    let user = match state.users.find_by_name_case_insensitive(&user_name).await {
        Ok(user) => user,
        Err(RepoError::NotFound(_)) => {
            tracing::info!(user_name = %user_name.trim(), "login failed: no such user");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let valid = state
        .hasher
        .verify_async(password, user.password_hash.clone())
        .await
        .internal("Password verification error")?;

    if !valid {
        tracing::info!(user_id = %user.id, "login failed: wrong password");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let token = state
        .tokens
        .issue(&user.id)
        .internal("Token signing error")?;

    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(LoginResponse {
        status: "ok",
        message: "Login successful",
        token,
    }))
}
