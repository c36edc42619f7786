use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/filter", get(filter_sales))
        .route("/revenue", get(revenue))
        .route("/revenue/compare", get(compare_revenue))
}

pub async fn filter_sales(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SalesFilterQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match services.sales.filter_sales(&filter).await {
        Ok(items) => Json(serde_json::json!({ "items": items })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn revenue(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::RevenueQuery>,
) -> axum::response::Response {
    let start_date = match dto::date_param(query.start_date) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let end_date = match dto::date_param(query.end_date) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let interval = dto::present(query.interval);

    match services
        .sales
        .revenue(start_date, end_date, interval.as_deref())
        .await
    {
        Ok(report) => Json(dto::revenue_to_json(report)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn compare_revenue(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CompareQuery>,
) -> axum::response::Response {
    let request = match query.into_request() {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.sales.compare_revenue(&request).await {
        Ok(comparison) => Json(comparison).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
