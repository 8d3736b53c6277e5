use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{served, PageParams};
use crate::api::validation::{parse_bool_filter, validate_password_len, validate_payload};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories::users::{NewUser, UserChanges, UserFilter};
use crate::repositories::StoreError;
use crate::schemas::user::{AdminUserCreate, AdminUserUpdate, UserResponse};
use crate::services::pagination::{paginate, PageResult};
use crate::services::text::{normalize_email, normalize_name};

#[derive(Debug, Deserialize)]
pub(crate) struct UserListQuery {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<UserRole>,
    #[serde(default)]
    enabled: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:user_id", get(get_user).patch(update_user))
}

async fn list_users(
    Query(paging): Query<PageParams>,
    Query(params): Query<UserListQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<PageResult<UserResponse>>, ApiError> {
    let filter = UserFilter {
        email: params.email.as_deref().map(normalize_email),
        role: params.role,
        enabled: parse_bool_filter("enabled", params.enabled.as_deref())?,
    };

    let result = paginate(
        state.users(),
        &filter,
        paging.request(),
        state.page_defaults(),
        paging.sort_order()?,
    )
    .await;

    Ok(Json(served("users", result, UserResponse::from_db)?))
}

async fn get_user(
    Path(user_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users()
        .find_by_id(&user_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(user)))
}

async fn create_user(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AdminUserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_payload(&payload)?;
    validate_password_len(&payload.password)?;

    let email = normalize_email(&payload.email);
    let existing = state
        .users()
        .find_by_email(&email)
        .await
        .map_err(|e| ApiError::store(e, "Failed to check existing user"))?;

    if existing.is_some() {
        return Err(ApiError::Conflict("User with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = state
        .users()
        .create(NewUser {
            id: Uuid::new_v4().to_string(),
            name: normalize_name(&payload.name),
            email,
            hashed_password,
            role: payload.role,
            enabled: payload.enabled,
            created_at: primitive_now_utc(),
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                ApiError::Conflict("User with this email already exists".to_string())
            }
            other => ApiError::store(other, "Failed to create user"),
        })?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        action = "user_create",
        "Admin created user"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from_db(user))))
}

async fn update_user(
    Path(user_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_payload(&payload)?;

    let hashed_password = match payload.password.as_deref() {
        Some(password) => {
            validate_password_len(password)?;
            Some(
                security::hash_password(password)
                    .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
            )
        }
        None => None,
    };

    let self_lockout = payload.enabled == Some(false) || payload.role == Some(UserRole::User);
    if admin.id == user_id && self_lockout {
        return Err(ApiError::BadRequest(
            "Administrators cannot demote or disable themselves".to_string(),
        ));
    }

    let updated = state
        .users()
        .update(
            &user_id,
            UserChanges {
                name: payload.name.as_deref().map(normalize_name),
                role: payload.role,
                enabled: payload.enabled,
                hashed_password,
                updated_at: primitive_now_utc(),
            },
        )
        .await
        .map_err(|e| ApiError::store(e, "Failed to update user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %updated.id,
        action = "user_update",
        "Admin updated user"
    );

    Ok(Json(UserResponse::from_db(updated)))
}
