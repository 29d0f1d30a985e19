//! Entity model for the retail data viewer (RDV).
//!
//! This crate provides the typed records loaded from the seed document.
//! Every other RDV crate depends on `rdv-types`.
//!
//! # Key Types
//!
//! - [`Store`] -- a physical store with address, image, and location
//! - [`Shelf`] -- a shelf belonging to a store, with a maximum capacity
//! - [`Product`] -- a sellable product with size and price in minor units
//! - [`InventoryItem`] -- stock of a product placed on a shelf of a store
//! - [`EntityKind`] -- type tag, collection key, and `urn:ngsi-ld` id scheme
//! - [`GeoPoint`] -- GeoJSON point as `[longitude, latitude]`
//!
//! Records are built with `from_json`, which applies field defaults and
//! reports absent required fields as [`ModelError::MissingField`]. Fields of
//! the wrong type still load (numbers as 0, other values as their JSON text)
//! so that validation can report them. No cross-entity validation happens
//! here.

pub mod entity;
pub mod error;
pub mod kind;
pub mod location;

mod fields;

pub use entity::{format_euros, InventoryItem, Product, Shelf, Store};
pub use error::ModelError;
pub use kind::EntityKind;
pub use location::GeoPoint;
