use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use backoffice_core::{CategoryId, InventoryId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/update", post(update))
        .route("/update/track", get(track))
}

pub async fn status(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StatusQuery>,
) -> axum::response::Response {
    let inv_id = match dto::parse_param::<InventoryId>(query.inv_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cat_id = match dto::parse_param::<CategoryId>(query.cat_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.status(inv_id, cat_id).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::UpdateInventoryRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                rejection.body_text(),
            );
        }
    };
    let Some(inv_id) = body.inv_id else {
        return inv_id_required();
    };

    match services.inventory.update(inv_id, &body.update).await {
        Ok(tracked) => Json(dto::tracked_update_to_json(tracked)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn track(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::TrackQuery>,
) -> axum::response::Response {
    let inv_id = match dto::parse_param::<InventoryId>(query.inv_id) {
        Ok(Some(v)) => v,
        Ok(None) => return inv_id_required(),
        Err(resp) => return resp,
    };

    match services.inventory.track(inv_id).await {
        Ok(items) => Json(serde_json::json!({ "items": items })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn inv_id_required() -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "inv_id is required")
}
