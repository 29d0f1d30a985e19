//! Seed documents for tests.
//!
//! [`valid_value`] builds the smallest document with no issues at all:
//! 4 stores with 4 shelves each, 10 products, and 2 items per shelf.

use std::path::{Path, PathBuf};

use rdv_types::EntityKind;
use serde_json::{json, Value};

use crate::document::SeedDocument;

pub const STORES: u64 = 4;
pub const SHELVES_PER_STORE: u64 = 4;
pub const PRODUCTS: u64 = 10;
pub const ITEMS_PER_SHELF: u64 = 2;
pub const MAX_CAPACITY: i64 = 20;
pub const STOCK_COUNT: i64 = 10;
pub const SHELF_COUNT: i64 = 5;

pub fn store_id(n: u64) -> String {
    EntityKind::Store.format_id(n)
}

pub fn shelf_id(n: u64) -> String {
    EntityKind::Shelf.format_id(n)
}

pub fn product_id(n: u64) -> String {
    EntityKind::Product.format_id(n)
}

pub fn item_id(n: u64) -> String {
    EntityKind::InventoryItem.format_id(n)
}

/// Store that owns shelf `n`.
pub fn store_of_shelf(n: u64) -> u64 {
    (n - 1) / SHELVES_PER_STORE + 1
}

fn location(store: u64) -> Value {
    json!({"type": "Point", "coordinates": [13.0 + store as f64, 52.0 + store as f64]})
}

pub fn valid_value() -> Value {
    let stores: Vec<Value> = (1..=STORES)
        .map(|n| {
            json!({
                "id": store_id(n),
                "type": "Store",
                "name": format!("Store {n}"),
                "address": format!("Main Street {n}"),
                "image": format!("https://images.example.com/store-{n}.jpg"),
                "location": location(n),
            })
        })
        .collect();

    let shelves: Vec<Value> = (1..=STORES * SHELVES_PER_STORE)
        .map(|n| {
            json!({
                "id": shelf_id(n),
                "type": "Shelf",
                "name": format!("Shelf {n:02}"),
                "location": location(store_of_shelf(n)),
                "maxCapacity": MAX_CAPACITY,
                "refStore": store_id(store_of_shelf(n)),
            })
        })
        .collect();

    let products: Vec<Value> = (1..=PRODUCTS)
        .map(|n| {
            json!({
                "id": product_id(n),
                "type": "Product",
                "name": format!("Product {n:02}"),
                "price": 100 * n,
                "size": "M",
                "image": format!("https://images.example.com/product-{n}.jpg"),
            })
        })
        .collect();

    let items: Vec<Value> = (1..=STORES * SHELVES_PER_STORE * ITEMS_PER_SHELF)
        .map(|n| {
            let shelf = (n - 1) / ITEMS_PER_SHELF + 1;
            let product = (n - 1) % PRODUCTS + 1;
            json!({
                "id": item_id(n),
                "type": "InventoryItem",
                "refProduct": product_id(product),
                "refStore": store_id(store_of_shelf(shelf)),
                "refShelf": shelf_id(shelf),
                "stockCount": STOCK_COUNT,
                "shelfCount": SHELF_COUNT,
            })
        })
        .collect();

    json!({
        "stores": stores,
        "shelves": shelves,
        "products": products,
        "inventoryItems": items,
    })
}

pub fn valid_document() -> SeedDocument {
    SeedDocument::from_value(valid_value()).expect("fixture is an object of arrays")
}

/// Write `value` as `seed.json` inside `dir`.
pub fn write_seed(dir: &Path, value: &Value) -> PathBuf {
    let path = dir.join("seed.json");
    let doc = SeedDocument::from_value(value.clone()).expect("fixture is an object of arrays");
    doc.write(&path).expect("fixture seed is writable");
    path
}
