use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{served, PageParams};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::{parse_offset_flexible, primitive_now_utc};
use crate::db::types::DrawStatus;
use crate::repositories::draws::{DrawChanges, DrawFilter, NewDraw};
use crate::schemas::draw::{DrawCreate, DrawResponse, DrawUpdate};
use crate::services::pagination::{paginate, PageResult};
use crate::services::text::normalize_name;

#[derive(Debug, Deserialize)]
pub(crate) struct DrawListQuery {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_draws).post(create_draw))
        .route("/:draw_id", get(get_draw).patch(update_draw))
}

/// Empty means "no filter"; anything but a known status is a 400.
fn parse_status_filter(raw: Option<&str>) -> Result<Option<DrawStatus>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    match raw.to_ascii_lowercase().as_str() {
        "scheduled" => Ok(Some(DrawStatus::Scheduled)),
        "completed" => Ok(Some(DrawStatus::Completed)),
        "cancelled" => Ok(Some(DrawStatus::Cancelled)),
        _ => Err(ApiError::BadRequest(format!("Invalid value for 'status': {raw}"))),
    }
}

/// Parses a draw date and checks it against the configured draw window.
fn scheduled_at(state: &AppState, raw: &str) -> Result<OffsetDateTime, ApiError> {
    let at = parse_offset_flexible(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid draw_date: {raw}")))?;

    if !state.settings().draws().contains(at) {
        return Err(ApiError::BadRequest(
            "draw_date is outside the allowed draw window".to_string(),
        ));
    }

    Ok(at.to_offset(UtcOffset::UTC))
}

async fn list_draws(
    Query(paging): Query<PageParams>,
    Query(params): Query<DrawListQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PageResult<DrawResponse>>, ApiError> {
    let filter = DrawFilter {
        title: params.title.as_deref().map(normalize_name).filter(|title| !title.is_empty()),
        status: parse_status_filter(params.status.as_deref())?,
    };

    let result = paginate(
        state.draws(),
        &filter,
        paging.request(),
        state.page_defaults(),
        paging.sort_order()?,
    )
    .await;

    Ok(Json(served("draws", result, DrawResponse::from_db)?))
}

async fn get_draw(
    Path(draw_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<DrawResponse>, ApiError> {
    let draw = state
        .draws()
        .find_by_id(&draw_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch draw"))?
        .ok_or_else(|| ApiError::NotFound("Draw not found".to_string()))?;

    Ok(Json(DrawResponse::from_db(draw)))
}

async fn create_draw(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<DrawCreate>,
) -> Result<(StatusCode, Json<DrawResponse>), ApiError> {
    validate_payload(&payload)?;
    let draw_date = scheduled_at(&state, &payload.draw_date)?;

    let draw = state
        .draws()
        .create(NewDraw {
            id: Uuid::new_v4().to_string(),
            title: normalize_name(&payload.title),
            description: payload.description.trim().to_string(),
            prize: payload.prize.trim().to_string(),
            draw_date,
            status: payload.status,
            enabled: payload.enabled,
            created_by: admin.id.clone(),
            created_at: primitive_now_utc(),
        })
        .await
        .map_err(|e| ApiError::store(e, "Failed to create draw"))?;

    tracing::info!(
        admin_id = %admin.id,
        draw_id = %draw.id,
        action = "draw_create",
        "Draw created"
    );

    Ok((StatusCode::CREATED, Json(DrawResponse::from_db(draw))))
}

async fn update_draw(
    Path(draw_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<DrawUpdate>,
) -> Result<Json<DrawResponse>, ApiError> {
    validate_payload(&payload)?;
    let draw_date = payload
        .draw_date
        .as_deref()
        .map(|raw| scheduled_at(&state, raw))
        .transpose()?;

    let updated = state
        .draws()
        .update(
            &draw_id,
            DrawChanges {
                title: payload.title.as_deref().map(normalize_name),
                description: payload.description.map(|value| value.trim().to_string()),
                prize: payload.prize.map(|value| value.trim().to_string()),
                draw_date,
                status: payload.status,
                enabled: payload.enabled,
                updated_at: primitive_now_utc(),
            },
        )
        .await
        .map_err(|e| ApiError::store(e, "Failed to update draw"))?
        .ok_or_else(|| ApiError::NotFound("Draw not found".to_string()))?;

    tracing::info!(
        admin_id = %admin.id,
        draw_id = %updated.id,
        action = "draw_update",
        "Draw updated"
    );

    Ok(Json(DrawResponse::from_db(updated)))
}
