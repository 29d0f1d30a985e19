use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use rdv_store::{DataRepository, InventoryRow, ShelfView};
use rdv_types::{EntityKind, InventoryItem, Product, Store};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ServerError, ServerResult};
use crate::forms::{InventoryItemForm, ProductForm, ShelfForm, StockForm, StoreForm};
use crate::state::AppState;

type Created = (StatusCode, Json<Value>);

#[derive(Debug, Serialize)]
pub struct StoreDetail {
    pub store: Store,
    pub shelves: Vec<ShelfView>,
    pub inventory: Vec<InventoryRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub display_price: String,
    pub inventory: Vec<InventoryRow>,
}

fn not_found(kind: EntityKind, id: &str) -> ServerError {
    ServerError::NotFound(format!("{kind} {id}"))
}

fn created(id: String) -> Created {
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

fn require_store<'a>(repo: &'a DataRepository, store_id: &str) -> ServerResult<&'a Store> {
    repo.get_store(store_id)
        .ok_or_else(|| not_found(EntityKind::Store, store_id))
}

fn require_product<'a>(repo: &'a DataRepository, product_id: &str) -> ServerResult<&'a Product> {
    repo.get_product(product_id)
        .ok_or_else(|| not_found(EntityKind::Product, product_id))
}

/// The store exists and owns the shelf.
fn require_store_shelf(repo: &DataRepository, store_id: &str, shelf_id: &str) -> ServerResult<()> {
    require_store(repo, store_id)?;
    match repo.get_shelf(shelf_id) {
        Some(shelf) if shelf.ref_store == store_id => Ok(()),
        _ => Err(not_found(EntityKind::Shelf, shelf_id)),
    }
}

/// The item exists and satisfies `belongs`.
fn require_item(
    repo: &DataRepository,
    item_id: &str,
    belongs: impl Fn(&InventoryItem) -> bool,
) -> ServerResult<()> {
    match repo.get_inventory_item(item_id) {
        Some(item) if belongs(item) => Ok(()),
        _ => Err(not_found(EntityKind::InventoryItem, item_id)),
    }
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": "rdv-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Stores

pub async fn list_stores(State(state): State<AppState>) -> ServerResult<Json<Vec<Store>>> {
    state
        .with_repository(move |repo| Ok(Json(repo.list_stores().into_iter().cloned().collect())))
        .await
}

pub async fn get_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> ServerResult<Json<StoreDetail>> {
    state
        .with_repository(move |repo| {
            let store = require_store(repo, &store_id)?.clone();
            Ok(Json(StoreDetail {
                store,
                shelves: repo.list_shelves_by_store(&store_id),
                inventory: repo.list_inventory_by_store(&store_id),
            }))
        })
        .await
}

pub async fn create_store(
    State(state): State<AppState>,
    Json(form): Json<StoreForm>,
) -> ServerResult<Created> {
    let input = form.validate().map_err(ServerError::Form)?;
    state
        .with_repository(move |repo| Ok(created(repo.create_store(input)?)))
        .await
}

pub async fn update_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Json(form): Json<StoreForm>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_store(repo, &store_id)?;
            let input = form.validate().map_err(ServerError::Form)?;
            repo.update_store(&store_id, input)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn delete_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_store(repo, &store_id)?;
            repo.delete_store(&store_id)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

// Shelves

pub async fn create_shelf(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Json(form): Json<ShelfForm>,
) -> ServerResult<Created> {
    state
        .with_repository(move |repo| {
            require_store(repo, &store_id)?;
            let input = form.validate().map_err(ServerError::Form)?;
            Ok(created(repo.create_shelf(&store_id, input)?))
        })
        .await
}

pub async fn update_shelf(
    State(state): State<AppState>,
    Path((store_id, shelf_id)): Path<(String, String)>,
    Json(form): Json<ShelfForm>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_store_shelf(repo, &store_id, &shelf_id)?;
            let input = form.validate().map_err(ServerError::Form)?;
            repo.update_shelf(&shelf_id, input)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn delete_shelf(
    State(state): State<AppState>,
    Path((store_id, shelf_id)): Path<(String, String)>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_store_shelf(repo, &store_id, &shelf_id)?;
            repo.delete_shelf(&shelf_id)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

// Products

pub async fn list_products(State(state): State<AppState>) -> ServerResult<Json<Vec<Product>>> {
    state
        .with_repository(move |repo| Ok(Json(repo.list_products().into_iter().cloned().collect())))
        .await
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ServerResult<Json<ProductDetail>> {
    state
        .with_repository(move |repo| {
            let product = require_product(repo, &product_id)?.clone();
            Ok(Json(ProductDetail {
                display_price: product.display_price(),
                product,
                inventory: repo.list_inventory_by_product(&product_id),
            }))
        })
        .await
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> ServerResult<Created> {
    let input = form.validate().map_err(ServerError::Form)?;
    state
        .with_repository(move |repo| Ok(created(repo.create_product(input)?)))
        .await
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(form): Json<ProductForm>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_product(repo, &product_id)?;
            let input = form.validate().map_err(ServerError::Form)?;
            repo.update_product(&product_id, input)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_product(repo, &product_id)?;
            repo.delete_product(&product_id)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

// Inventory under a store

pub async fn create_store_item(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Json(mut form): Json<InventoryItemForm>,
) -> ServerResult<Created> {
    state
        .with_repository(move |repo| {
            require_store(repo, &store_id)?;
            form.store_id = Some(store_id);
            let input = form.validate().map_err(ServerError::Form)?;
            Ok(created(repo.create_inventory_item(input)?))
        })
        .await
}

pub async fn update_store_item(
    State(state): State<AppState>,
    Path((store_id, item_id)): Path<(String, String)>,
    Json(form): Json<StockForm>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_store(repo, &store_id)?;
            require_item(repo, &item_id, |item| item.ref_store == store_id)?;
            let stock = form.validate().map_err(ServerError::Form)?;
            repo.update_inventory_item(&item_id, stock)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn delete_store_item(
    State(state): State<AppState>,
    Path((store_id, item_id)): Path<(String, String)>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_store(repo, &store_id)?;
            require_item(repo, &item_id, |item| item.ref_store == store_id)?;
            repo.delete_inventory_item(&item_id)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

// Inventory under a product

pub async fn create_product_item(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(mut form): Json<InventoryItemForm>,
) -> ServerResult<Created> {
    state
        .with_repository(move |repo| {
            require_product(repo, &product_id)?;
            form.product_id = Some(product_id);
            let input = form.validate().map_err(ServerError::Form)?;
            Ok(created(repo.create_inventory_item(input)?))
        })
        .await
}

pub async fn update_product_item(
    State(state): State<AppState>,
    Path((product_id, item_id)): Path<(String, String)>,
    Json(form): Json<StockForm>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_product(repo, &product_id)?;
            require_item(repo, &item_id, |item| item.ref_product == product_id)?;
            let stock = form.validate().map_err(ServerError::Form)?;
            repo.update_inventory_item(&item_id, stock)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn delete_product_item(
    State(state): State<AppState>,
    Path((product_id, item_id)): Path<(String, String)>,
) -> ServerResult<StatusCode> {
    state
        .with_repository(move |repo| {
            require_product(repo, &product_id)?;
            require_item(repo, &item_id, |item| item.ref_product == product_id)?;
            repo.delete_inventory_item(&item_id)?;
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

// Global views

pub async fn list_inventory(State(state): State<AppState>) -> ServerResult<Json<Vec<InventoryRow>>> {
    state
        .with_repository(move |repo| Ok(Json(repo.list_inventory_global())))
        .await
}

pub async fn list_warnings(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    state
        .with_repository(move |repo| {
            let issues: Vec<Value> = repo
                .issues()
                .iter()
                .map(|issue| {
                    json!({
                        "blocking": issue.is_blocking(),
                        "message": issue.message,
                    })
                })
                .collect();
            Ok(Json(json!({
                "warnings": repo.warnings(),
                "issues": issues,
                "shelfLoads": repo.shelf_loads(),
            })))
        })
        .await
}
