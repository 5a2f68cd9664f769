// Profile handlers (behind the bearer-token middleware)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    auth::middleware::AuthUser,
    db::{User, UserUpdate},
    error::AppError,
    handlers::string_field,
    AppState,
};

// Fields stay loosely typed: a non-string value leaves the stored one untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    user_name: Option<Value>,
    mail: Option<Value>,
    tel: Option<Value>,
    user_password: Option<Value>,
}

// GET /usuarios/{id}
pub async fn get_user(
    caller: AuthUser,
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    tracing::debug!(caller = %caller.user_id, user_id = %id, "fetching profile");
    let user = state.users.find_by_id(&id).await?;
    Ok(Json(user))
}

// PUT /usuarios/{id} - Partial update; blank fields are ignored
pub async fn update_user(
    caller: AuthUser,
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    let Json(form) = payload?;
    tracing::debug!(caller = %caller.user_id, user_id = %id, "updating profile");

    let user = state
        .users
        .update(
            &id,
            UserUpdate {
                user_name: string_field(form.user_name),
                mail: string_field(form.mail),
                tel: string_field(form.tel),
                password: string_field(form.user_password),
            },
        )
        .await?;

    Ok(Json(user))
}
