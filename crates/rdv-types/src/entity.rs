//! Typed records for the four entity kinds.
//!
//! Each record serializes back to the camelCase storage shape, so a record
//! built in memory can be inserted into a seed document as-is.

use serde::Serialize;
use serde_json::Value;

use crate::error::ModelError;
use crate::fields::Fields;
use crate::kind::EntityKind;
use crate::location::GeoPoint;

/// A physical store.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub address: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Store {
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let f = Fields::of(EntityKind::Store, value)?;
        Ok(Self {
            id: f.id()?,
            kind: f.type_tag(),
            name: f.string("name")?,
            address: f.string("address")?,
            image: f.string_or_default("image"),
            location: f.location(),
        })
    }
}

/// A shelf inside a store.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub max_capacity: i64,
    pub ref_store: String,
}

impl Shelf {
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let f = Fields::of(EntityKind::Shelf, value)?;
        Ok(Self {
            id: f.id()?,
            kind: f.type_tag(),
            name: f.string("name")?,
            location: f.location(),
            max_capacity: f.integer("maxCapacity")?,
            ref_store: f.string("refStore")?,
        })
    }
}

/// A product. `price` is in minor currency units.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub price: i64,
    pub size: String,
    pub image: String,
}

impl Product {
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let f = Fields::of(EntityKind::Product, value)?;
        Ok(Self {
            id: f.id()?,
            kind: f.type_tag(),
            name: f.string("name")?,
            price: f.integer("price")?,
            size: f.string("size")?,
            image: f.string_or_default("image"),
        })
    }

    /// Price formatted in euros, e.g. `€12.34`.
    pub fn display_price(&self) -> String {
        format_euros(self.price)
    }
}

/// Format minor units as a euro amount with two decimals.
pub fn format_euros(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}€{}.{:02}", abs / 100, abs % 100)
}

/// Stock of one product on one shelf of one store.
///
/// `stock_count` is the total number of units, `shelf_count` the units
/// physically on the shelf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ref_product: String,
    pub ref_store: String,
    pub ref_shelf: String,
    pub stock_count: i64,
    pub shelf_count: i64,
}

impl InventoryItem {
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let f = Fields::of(EntityKind::InventoryItem, value)?;
        Ok(Self {
            id: f.id()?,
            kind: f.type_tag(),
            ref_product: f.string("refProduct")?,
            ref_store: f.string("refStore")?,
            ref_shelf: f.string("refShelf")?,
            stock_count: f.integer("stockCount")?,
            shelf_count: f.integer("shelfCount")?,
        })
    }
}
