//! Field values accepted by the mutation operations.
//!
//! Callers pass values that already passed syntactic checks (trimmed,
//! required, in range). The repository validates the resulting document.

#[derive(Clone, Debug, PartialEq)]
pub struct StoreInput {
    pub name: String,
    pub address: String,
    pub image: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub size: String,
    /// Minor currency units.
    pub price: i64,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShelfInput {
    pub name: String,
    pub max_capacity: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StockInput {
    pub stock_count: i64,
    pub shelf_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryItemInput {
    pub store_id: String,
    pub shelf_id: String,
    pub product_id: String,
    pub stock: StockInput,
}
