use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route(
            "/v1/stores",
            get(handler::list_stores).post(handler::create_store),
        )
        .route(
            "/v1/stores/:store_id",
            get(handler::get_store)
                .put(handler::update_store)
                .delete(handler::delete_store),
        )
        .route("/v1/stores/:store_id/shelves", post(handler::create_shelf))
        .route(
            "/v1/stores/:store_id/shelves/:shelf_id",
            put(handler::update_shelf).delete(handler::delete_shelf),
        )
        .route(
            "/v1/stores/:store_id/inventory",
            post(handler::create_store_item),
        )
        .route(
            "/v1/stores/:store_id/inventory/:item_id",
            put(handler::update_store_item).delete(handler::delete_store_item),
        )
        .route(
            "/v1/products",
            get(handler::list_products).post(handler::create_product),
        )
        .route(
            "/v1/products/:product_id",
            get(handler::get_product)
                .put(handler::update_product)
                .delete(handler::delete_product),
        )
        .route(
            "/v1/products/:product_id/inventory",
            post(handler::create_product_item),
        )
        .route(
            "/v1/products/:product_id/inventory/:item_id",
            put(handler::update_product_item).delete(handler::delete_product_item),
        )
        .route("/v1/inventory", get(handler::list_inventory))
        .route("/v1/warnings", get(handler::list_warnings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
