use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::schemas::auth::{TokenRequest, TokenResponse};
use crate::schemas::user::UserResponse;
use crate::services::text::normalize_email;

/// Max token attempts per email per window.
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/token", post(token)).route("/me", get(me))
}

async fn token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&payload.email);

    let rate_key = format!("rl:token:{email}");
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many token attempts, try again later"));
    }

    let user = state
        .users()
        .find_by_email(&email)
        .await
        .map_err(|e| ApiError::store(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    if !user.enabled {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let access_token = security::create_access_token(&user.id, user.role, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    tracing::info!(user_id = %user.id, action = "token_issued", "Access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.settings().security().access_token_expire_minutes as i64 * 60,
        user: UserResponse::from_db(user),
    }))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn token_round_trip_reaches_me() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_user(&ctx.state, "ana@fortuna.local", "Ana", "ana-pass-123").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/token",
                None,
                Some(json!({ "email": "ANA@fortuna.local ", "senha": "ana-pass-123" })),
            ))
            .await
            .expect("token");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["expires_in"], 15 * 60);
        let token = body["access_token"].as_str().expect("access token").to_string();

        let response = ctx
            .app
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/auth/me",
                Some(&token),
                None,
            ))
            .await
            .expect("me");

        assert_eq!(response.status(), StatusCode::OK);
        let me = test_support::read_json(response).await;
        assert_eq!(me["email"], "ana@fortuna.local");
        assert_eq!(me["role"], "user");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_user(&ctx.state, "ana@fortuna.local", "Ana", "ana-pass-123").await;

        let response = ctx
            .app
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/token",
                None,
                Some(json!({ "email": "ana@fortuna.local", "password": "wrong-pass" })),
            ))
            .await
            .expect("token");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
    }

    #[tokio::test]
    async fn me_requires_a_token() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", None, None))
            .await
            .expect("me");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
