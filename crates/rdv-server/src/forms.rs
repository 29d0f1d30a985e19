//! Syntactic checks on submitted fields.
//!
//! Forms trim text, enforce required fields, lengths, and numeric ranges,
//! and turn the submission into a repository input. Semantic checks
//! (references, capacities) stay with the repository.

use rdv_store::{InventoryItemInput, ProductInput, ShelfInput, StockInput, StoreInput};
use serde::Deserialize;

pub const NAME_MAX: usize = 120;
pub const ADDRESS_MAX: usize = 240;
pub const IMAGE_MAX: usize = 400;
pub const SIZE_MAX: usize = 24;
pub const COORDINATE_MAX: usize = 32;
pub const REF_MAX: usize = 80;
pub const CAPACITY_MAX: i64 = 100_000;
pub const COUNT_MAX: i64 = 1_000_000;
pub const PRICE_MAX: i64 = 100_000_000;

#[derive(Default)]
struct Checker {
    errors: Vec<String>,
}

impl Checker {
    fn text(&mut self, field: &str, value: Option<String>, max: usize) -> String {
        let value = value.unwrap_or_default();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.errors.push(format!("{field}: this field is required"));
        } else if trimmed.chars().count() > max {
            self.errors
                .push(format!("{field}: must be between 1 and {max} characters"));
        }
        trimmed.to_owned()
    }

    fn number(&mut self, field: &str, value: Option<i64>, max: i64) -> i64 {
        match value {
            None => {
                self.errors.push(format!("{field}: this field is required"));
                0
            }
            Some(n) if !(0..=max).contains(&n) => {
                self.errors
                    .push(format!("{field}: must be between 0 and {max}"));
                n
            }
            Some(n) => n,
        }
    }

    fn coordinate(&mut self, field: &str, value: Option<String>) -> f64 {
        let before = self.errors.len();
        let text = self.text(field, value, COORDINATE_MAX);
        if self.errors.len() > before {
            return 0.0;
        }
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => {
                self.errors
                    .push(format!("{field}: must be a decimal number"));
                0.0
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<String>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StoreForm {
    pub name: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl StoreForm {
    pub fn validate(self) -> Result<StoreInput, Vec<String>> {
        let mut c = Checker::default();
        let input = StoreInput {
            name: c.text("name", self.name, NAME_MAX),
            address: c.text("address", self.address, ADDRESS_MAX),
            image: c.text("image", self.image, IMAGE_MAX),
            latitude: c.coordinate("latitude", self.latitude),
            longitude: c.coordinate("longitude", self.longitude),
        };
        c.finish(input)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub size: Option<String>,
    pub price: Option<i64>,
    pub image: Option<String>,
}

impl ProductForm {
    pub fn validate(self) -> Result<ProductInput, Vec<String>> {
        let mut c = Checker::default();
        let input = ProductInput {
            name: c.text("name", self.name, NAME_MAX),
            size: c.text("size", self.size, SIZE_MAX),
            price: c.number("price", self.price, PRICE_MAX),
            image: c.text("image", self.image, IMAGE_MAX),
        };
        c.finish(input)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ShelfForm {
    pub name: Option<String>,
    pub max_capacity: Option<i64>,
}

impl ShelfForm {
    pub fn validate(self) -> Result<ShelfInput, Vec<String>> {
        let mut c = Checker::default();
        let input = ShelfInput {
            name: c.text("name", self.name, NAME_MAX),
            max_capacity: c.number("max_capacity", self.max_capacity, CAPACITY_MAX),
        };
        c.finish(input)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StockForm {
    pub stock_count: Option<i64>,
    pub shelf_count: Option<i64>,
}

impl StockForm {
    fn check(self, c: &mut Checker) -> StockInput {
        let stock_count = c.number("stock_count", self.stock_count, COUNT_MAX);
        let shelf_count = c.number("shelf_count", self.shelf_count, COUNT_MAX);
        if self.stock_count.is_some() && self.shelf_count.is_some() && shelf_count > stock_count {
            c.errors
                .push("shelf_count: must not exceed stock_count".to_owned());
        }
        StockInput {
            stock_count,
            shelf_count,
        }
    }

    pub fn validate(self) -> Result<StockInput, Vec<String>> {
        let mut c = Checker::default();
        let input = self.check(&mut c);
        c.finish(input)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InventoryItemForm {
    pub store_id: Option<String>,
    pub shelf_id: Option<String>,
    pub product_id: Option<String>,
    #[serde(flatten)]
    pub stock: StockForm,
}

impl InventoryItemForm {
    pub fn validate(self) -> Result<InventoryItemInput, Vec<String>> {
        let mut c = Checker::default();
        let input = InventoryItemInput {
            store_id: c.text("store_id", self.store_id, REF_MAX),
            shelf_id: c.text("shelf_id", self.shelf_id, REF_MAX),
            product_id: c.text("product_id", self.product_id, REF_MAX),
            stock: self.stock.check(&mut c),
        };
        c.finish(input)
    }
}
