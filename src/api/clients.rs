use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_client_access, CurrentUser};
use crate::api::pagination::{served, PageParams};
use crate::api::validation::{parse_bool_filter, validate_document, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories::clients::{ClientChanges, ClientFilter, NewClient};
use crate::repositories::StoreError;
use crate::schemas::client::{ClientCreate, ClientResponse, ClientUpdate};
use crate::services::pagination::{paginate, PageResult};
use crate::services::text::{normalize_email, normalize_name};

const DUPLICATE_DOCUMENT: &str = "A client with this document already exists";

#[derive(Debug, Deserialize)]
pub(crate) struct ClientListQuery {
    #[serde(default, alias = "nome")]
    name: Option<String>,
    #[serde(default, alias = "enable")]
    enabled: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:client_id", get(get_client).patch(update_client))
}

async fn list_clients(
    Query(paging): Query<PageParams>,
    Query(params): Query<ClientListQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PageResult<ClientResponse>>, ApiError> {
    let filter = ClientFilter {
        user_id: (!user.is_admin()).then(|| user.id.clone()),
        name: params.name.as_deref().map(normalize_name).filter(|name| !name.is_empty()),
        enabled: parse_bool_filter("enabled", params.enabled.as_deref())?,
    };

    let result = paginate(
        state.clients(),
        &filter,
        paging.request(),
        state.page_defaults(),
        paging.sort_order()?,
    )
    .await;

    Ok(Json(served("clients", result, ClientResponse::from_db)?))
}

async fn get_client(
    Path(client_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = require_client_access(&state, &user, &client_id).await?;
    Ok(Json(ClientResponse::from_db(client)))
}

async fn create_client(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ClientCreate>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    validate_payload(&payload)?;
    let document = validate_document(payload.kind, &payload.document)?;

    let taken = state
        .clients()
        .exists_by_document(document.digits())
        .await
        .map_err(|e| ApiError::store(e, "Failed to check existing client"))?;

    if taken {
        return Err(ApiError::Conflict(DUPLICATE_DOCUMENT.to_string()));
    }

    let client = state
        .clients()
        .create(NewClient {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            name: normalize_name(&payload.name),
            email: payload.email.as_deref().map(normalize_email).unwrap_or_default(),
            gender: payload.gender.unwrap_or_default(),
            phone: payload.phone.unwrap_or_default(),
            kind: payload.kind,
            document: document.into_digits(),
            enabled: true,
            created_at: primitive_now_utc(),
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent create for the same document.
            StoreError::Conflict(_) => ApiError::Conflict(DUPLICATE_DOCUMENT.to_string()),
            other => ApiError::store(other, "Failed to create client"),
        })?;

    tracing::info!(
        user_id = %user.id,
        client_id = %client.id,
        action = "client_create",
        "Client created"
    );

    Ok((StatusCode::CREATED, Json(ClientResponse::from_db(client))))
}

async fn update_client(
    Path(client_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ClientUpdate>,
) -> Result<Json<ClientResponse>, ApiError> {
    validate_payload(&payload)?;
    require_client_access(&state, &user, &client_id).await?;

    let updated = state
        .clients()
        .update(
            &client_id,
            ClientChanges {
                name: payload.name.as_deref().map(normalize_name),
                email: payload.email.as_deref().map(normalize_email),
                gender: payload.gender,
                phone: payload.phone,
                enabled: payload.enabled,
                updated_at: primitive_now_utc(),
            },
        )
        .await
        .map_err(|e| ApiError::store(e, "Failed to update client"))?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    tracing::info!(
        user_id = %user.id,
        client_id = %updated.id,
        action = "client_update",
        "Client updated"
    );

    Ok(Json(ClientResponse::from_db(updated)))
}
