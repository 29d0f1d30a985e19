use rdv_types::GeoPoint;
use serde::Serialize;

/// Placeholder shown when a reference does not resolve.
pub const NOT_AVAILABLE: &str = "N/A";

/// A shelf together with its current load.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfView {
    pub id: String,
    pub name: String,
    pub max_capacity: i64,
    pub current_load: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// An inventory item joined with display fields of its store, shelf, and
/// product. Dangling references render as [`NOT_AVAILABLE`], an empty image,
/// or a zero price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub id: String,
    pub store_id: String,
    pub store_name: String,
    pub store_image: String,
    pub shelf_id: String,
    pub shelf_name: String,
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub product_size: String,
    pub product_price: i64,
    pub stock_count: i64,
    pub shelf_count: i64,
}
