//! REST API for the inventory catalog.
//!
//! Endpoints:
//! - `GET /inventory/item?page={p}&size={s}` — one page of items; a `Link`
//!   header with `rel="next"` is attached while more pages exist
//! - `GET /inventory/item/{itemId}` — a single item, 404 when absent
//! - `POST /inventory/item` — create an item; 201 with `Location` and a self link
//! - `DELETE /inventory/item/{itemId}` — delete an item; 200 whether or not it existed
//! - `POST /util/order?itemId={i}&count={n}` — simulate a completed order
//!   (dev utility, registered only when `http.order_endpoint` is enabled)
//! - `GET /health` — health check
//!
//! Every failing response carries the same JSON error body; see [`ApiError`].

mod error;
mod extract;

pub use error::ApiError;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use self::extract::{ApiJson, ApiPath, ApiQuery};
use crate::bus::NoticeBus;
use crate::config::HttpConfig;
use crate::messages::Notice;
use crate::model::InventoryItem;
use crate::page::{Page, PageRequest};
use crate::service::InventoryService;
use crate::store::StoreError;

/// Page size served when the request names no window.
///
/// Suitable for the seeded demo catalog (12 items, two pages).
pub const DEFAULT_PAGE_SIZE: u64 = 6;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: InventoryService,
    pub publisher: Arc<dyn NoticeBus>,
}

/// Start the REST server on the configured address.
///
/// When the port is 0, the OS assigns an ephemeral one. The actual bound
/// address is always logged so it can be discovered.
pub async fn serve(
    state: AppState,
    config: &HttpConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state, config.order_endpoint);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let actual_addr = listener.local_addr()?;
    info!(addr = %actual_addr, "inventory REST API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the axum router (separated for testing).
///
/// The order simulator endpoint mutates stock via the bus with no
/// authentication, so it is only registered when explicitly enabled.
pub fn router(state: AppState, order_endpoint: bool) -> Router {
    let mut router = Router::new()
        .route(
            "/inventory/item",
            get(get_inventory).post(create_inventory_item),
        )
        .route(
            "/inventory/item/{itemId}",
            get(get_inventory_item).delete(delete_inventory_item),
        )
        .route("/health", get(health));

    if order_endpoint {
        router = router.route("/util/order", post(place_order));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> StatusCode {
    StatusCode::OK
}

/// One page of the catalog.
async fn get_inventory(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(params): ApiQuery<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let request = parse_window(&params)?;

    let page = state
        .service
        .get_inventory(request)
        .await
        .map_err(internal_error)?;

    let link = next_link(uri.path(), request, &page);

    let mut response = Json(page).into_response();
    if let Some(link) = link {
        insert_header(&mut response, header::LINK, link);
    }

    Ok(response)
}

/// A single item by id.
async fn get_inventory_item(
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<i64>,
) -> Result<Json<InventoryItem>, ApiError> {
    let item = state
        .service
        .get_item(item_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| ApiError::not_found(format!("No inventory item with id {}", item_id)))?;

    Ok(Json(item))
}

/// Create a new inventory item.
///
/// The id is assigned by the store; any id in the payload is ignored.
async fn create_inventory_item(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiJson(item): ApiJson<InventoryItem>,
) -> Result<Response, ApiError> {
    if let Err(violation) = item.validate() {
        warn!(%violation, "Rejecting invalid inventory item");
        return Err(ApiError::bad_request(violation.to_string()));
    }

    let created = state
        .service
        .create_item(item)
        .await
        .map_err(internal_error)?;

    info!(item_id = created.id, "Created inventory item");

    let mut response = StatusCode::CREATED.into_response();
    insert_header(
        &mut response,
        header::LINK,
        format!("<{}/{}>; rel=\"self\"", uri.path(), created.id),
    );
    insert_header(
        &mut response,
        header::LOCATION,
        format!("{}/{}", uri.path(), created.id),
    );

    Ok(response)
}

/// Delete an item. Deleting an absent item is not an error.
async fn delete_inventory_item(
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_item(item_id)
        .await
        .map_err(internal_error)?;

    info!(item_id, "Deleted inventory item");

    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderParams {
    item_id: i64,
    count: i64,
}

/// Simulate a completed order by publishing an order notice (dev utility).
async fn place_order(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<OrderParams>,
) -> Result<StatusCode, ApiError> {
    info!(
        item_id = params.item_id,
        count = params.count,
        "Posting an order notification"
    );

    let notice = Notice::OrderCompleted {
        item_id: params.item_id,
        count: params.count,
    };
    state.publisher.publish(&notice).await.map_err(|e| {
        error!(error = %e, "Unable to send order notice");
        ApiError::internal(e.to_string())
    })?;

    Ok(StatusCode::OK)
}

// ============================================================================
// Helpers
// ============================================================================

/// Window selection for the list endpoint.
///
/// An explicit window needs both `page` and `size`; with either absent the
/// default window (page 0, size 6) is served. `size` must be at least 1.
fn parse_window(params: &HashMap<String, String>) -> Result<PageRequest, ApiError> {
    let (page, size) = match (params.get("page"), params.get("size")) {
        (Some(page), Some(size)) => (page, size),
        _ => return Ok(PageRequest::of(0, DEFAULT_PAGE_SIZE)),
    };

    let page: u64 = page
        .parse()
        .map_err(|_| ApiError::bad_request("\"page\" must be a non-negative number"))?;
    let size: u64 = size
        .parse()
        .map_err(|_| ApiError::bad_request("\"size\" must be greater than 0"))?;
    if size == 0 {
        return Err(ApiError::bad_request("\"size\" must be greater than 0"));
    }

    Ok(PageRequest::of(page, size))
}

/// `Link` header value for the following page, when one exists.
///
/// The target reproduces the request path with `page=P+1&size=S`.
fn next_link(path: &str, request: PageRequest, page: &Page<InventoryItem>) -> Option<String> {
    page.has_next().then(|| {
        format!(
            "<{}?page={}&size={}>; rel=\"next\"",
            path,
            request.page.saturating_add(1),
            request.size
        )
    })
}

/// Map a storage failure to a 500 with its message, logging it.
fn internal_error(e: StoreError) -> ApiError {
    error!(error = %e, "Request failed");
    ApiError::internal(e.to_string())
}

fn insert_header(response: &mut Response, name: HeaderName, value: String) {
    match HeaderValue::try_from(value) {
        Ok(value) => {
            response.headers_mut().insert(name, value);
        }
        Err(e) => error!(error = %e, "Failed to set response header"),
    }
}
