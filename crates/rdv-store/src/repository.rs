use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use rdv_types::{EntityKind, GeoPoint, InventoryItem, Product, Shelf, Store};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::document::{entry_id, str_field, SeedDocument};
use crate::error::{RepositoryResult, ValidationFailure};
use crate::ids::next_id;
use crate::input::{InventoryItemInput, ProductInput, ShelfInput, StockInput, StoreInput};
use crate::validation::{collect_issues, Issue};
use crate::views::{InventoryRow, ShelfView, NOT_AVAILABLE};

/// Read-through view of a seed document plus its mutation operations.
///
/// Read accessors serve from caches rebuilt on every load. Every mutation
/// re-reads the file, edits the raw document, re-validates all of it, and
/// only writes when no blocking issue remains.
///
/// There is no locking around the read-modify-write cycle: with two writers
/// the later full overwrite wins. One writer per seed file is assumed.
#[derive(Debug)]
pub struct DataRepository {
    seed_path: PathBuf,
    stores: HashMap<String, Store>,
    shelves: HashMap<String, Shelf>,
    products: HashMap<String, Product>,
    inventory: Vec<InventoryItem>,
    issues: Vec<Issue>,
    shelf_loads: BTreeMap<String, i64>,
}

impl DataRepository {
    /// Load the seed document at `seed_path`.
    ///
    /// Unreadable files, invalid JSON, and entities missing required fields
    /// are errors: nothing is served from a partially understood document.
    pub fn open(seed_path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let mut repo = Self {
            seed_path: seed_path.into(),
            stores: HashMap::new(),
            shelves: HashMap::new(),
            products: HashMap::new(),
            inventory: Vec::new(),
            issues: Vec::new(),
            shelf_loads: BTreeMap::new(),
        };
        repo.reload()?;
        Ok(repo)
    }

    pub fn seed_path(&self) -> &Path {
        &self.seed_path
    }

    fn reload(&mut self) -> RepositoryResult<()> {
        let document = SeedDocument::read(&self.seed_path)?;
        let loaded = Loaded::build(&document)?;
        self.install(loaded);
        Ok(())
    }

    fn install(&mut self, loaded: Loaded) {
        self.stores = loaded.stores;
        self.shelves = loaded.shelves;
        self.products = loaded.products;
        self.inventory = loaded.inventory;
        self.issues = loaded.issues;
        self.shelf_loads = loaded.shelf_loads;

        debug!(
            path = %self.seed_path.display(),
            stores = self.stores.len(),
            shelves = self.shelves.len(),
            products = self.products.len(),
            items = self.inventory.len(),
            issues = self.issues.len(),
            "seed document loaded"
        );
    }

    // ---- Reads ----

    pub fn get_store(&self, id: &str) -> Option<&Store> {
        self.stores.get(id)
    }

    pub fn get_shelf(&self, id: &str) -> Option<&Shelf> {
        self.shelves.get(id)
    }

    pub fn get_product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn get_inventory_item(&self, id: &str) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.id == id)
    }

    pub fn list_stores(&self) -> Vec<&Store> {
        sorted_by_name(self.stores.values(), |s| (&s.name, &s.id))
    }

    pub fn list_shelves(&self) -> Vec<&Shelf> {
        sorted_by_name(self.shelves.values(), |s| (&s.name, &s.id))
    }

    pub fn list_products(&self) -> Vec<&Product> {
        sorted_by_name(self.products.values(), |p| (&p.name, &p.id))
    }

    /// Shelves of one store, sorted by name, with their current load.
    pub fn list_shelves_by_store(&self, store_id: &str) -> Vec<ShelfView> {
        let shelves = self.shelves.values().filter(|s| s.ref_store == store_id);
        sorted_by_name(shelves, |s| (&s.name, &s.id))
            .into_iter()
            .map(|shelf| ShelfView {
                id: shelf.id.clone(),
                name: shelf.name.clone(),
                max_capacity: shelf.max_capacity,
                current_load: self.shelf_load(&shelf.id),
                location: shelf.location.clone(),
            })
            .collect()
    }

    pub fn list_inventory_global(&self) -> Vec<InventoryRow> {
        self.inventory.iter().map(|item| self.enrich(item)).collect()
    }

    pub fn list_inventory_by_store(&self, store_id: &str) -> Vec<InventoryRow> {
        self.inventory
            .iter()
            .filter(|item| item.ref_store == store_id)
            .map(|item| self.enrich(item))
            .collect()
    }

    pub fn list_inventory_by_product(&self, product_id: &str) -> Vec<InventoryRow> {
        self.inventory
            .iter()
            .filter(|item| item.ref_product == product_id)
            .map(|item| self.enrich(item))
            .collect()
    }

    /// Issue messages from the last load, in rule order.
    pub fn warnings(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn shelf_loads(&self) -> &BTreeMap<String, i64> {
        &self.shelf_loads
    }

    pub fn shelf_load(&self, shelf_id: &str) -> i64 {
        self.shelf_loads.get(shelf_id).copied().unwrap_or(0)
    }

    fn enrich(&self, item: &InventoryItem) -> InventoryRow {
        let store = self.stores.get(&item.ref_store);
        let shelf = self.shelves.get(&item.ref_shelf);
        let product = self.products.get(&item.ref_product);

        InventoryRow {
            id: item.id.clone(),
            store_id: item.ref_store.clone(),
            store_name: store.map_or_else(not_available, |s| s.name.clone()),
            store_image: store.map(|s| s.image.clone()).unwrap_or_default(),
            shelf_id: item.ref_shelf.clone(),
            shelf_name: shelf.map_or_else(not_available, |s| s.name.clone()),
            product_id: item.ref_product.clone(),
            product_name: product.map_or_else(not_available, |p| p.name.clone()),
            product_image: product.map(|p| p.image.clone()).unwrap_or_default(),
            product_size: product.map_or_else(not_available, |p| p.size.clone()),
            product_price: product.map_or(0, |p| p.price),
            stock_count: item.stock_count,
            shelf_count: item.shelf_count,
        }
    }

    // ---- Mutations ----

    /// Run `apply` against a fresh copy of the document, then validate it and
    /// build the typed caches from it. The file is only written once both
    /// succeed.
    fn mutate<T>(
        &mut self,
        operation: &str,
        apply: impl FnOnce(&mut SeedDocument) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let mut document = SeedDocument::read(&self.seed_path)?;
        let outcome = apply(&mut document)?;

        let report = collect_issues(&document);
        if report.has_blocking() {
            let messages = report.blocking_messages();
            warn!(operation, blocking = messages.len(), "mutation rejected");
            return Err(ValidationFailure::new(messages).into());
        }

        let loaded = Loaded::build(&document)?;
        document.write(&self.seed_path)?;
        self.install(loaded);
        info!(operation, "mutation committed");
        Ok(outcome)
    }

    pub fn create_store(&mut self, input: StoreInput) -> RepositoryResult<String> {
        self.mutate("create_store", |doc| {
            let location = store_location(&input)?;
            let id = next_id(EntityKind::Store, doc.entries(EntityKind::Store))?;
            let store = Store {
                id: id.clone(),
                kind: EntityKind::Store.type_name().into(),
                name: input.name,
                address: input.address,
                image: input.image,
                location: Some(location),
            };
            insert(doc, EntityKind::Store, &store)?;
            Ok(id)
        })
    }

    pub fn update_store(&mut self, store_id: &str, input: StoreInput) -> RepositoryResult<()> {
        self.mutate("update_store", |doc| {
            let location = to_value(&store_location(&input)?)?;
            let entry = existing(doc, EntityKind::Store, store_id)?;
            entry["name"] = json!(input.name);
            entry["address"] = json!(input.address);
            entry["image"] = json!(input.image);
            entry["location"] = location;
            Ok(())
        })
    }

    /// Delete a store, its shelves, and every item on the store or those shelves.
    pub fn delete_store(&mut self, store_id: &str) -> RepositoryResult<()> {
        self.mutate("delete_store", |doc| {
            require(doc, EntityKind::Store, store_id)?;
            remove_where(doc, EntityKind::Store, |e| entry_id(e) == Some(store_id))?;

            let mut removed_shelves = HashSet::new();
            remove_where(doc, EntityKind::Shelf, |e| {
                let owned = str_field(e, "refStore") == Some(store_id);
                if owned {
                    if let Some(id) = entry_id(e) {
                        removed_shelves.insert(id.to_owned());
                    }
                }
                owned
            })?;

            remove_where(doc, EntityKind::InventoryItem, |e| {
                str_field(e, "refStore") == Some(store_id)
                    || str_field(e, "refShelf").is_some_and(|s| removed_shelves.contains(s))
            })?;
            Ok(())
        })
    }

    pub fn create_product(&mut self, input: ProductInput) -> RepositoryResult<String> {
        self.mutate("create_product", |doc| {
            let id = next_id(EntityKind::Product, doc.entries(EntityKind::Product))?;
            let product = Product {
                id: id.clone(),
                kind: EntityKind::Product.type_name().into(),
                name: input.name,
                price: input.price,
                size: input.size,
                image: input.image,
            };
            insert(doc, EntityKind::Product, &product)?;
            Ok(id)
        })
    }

    pub fn update_product(&mut self, product_id: &str, input: ProductInput) -> RepositoryResult<()> {
        self.mutate("update_product", |doc| {
            let entry = existing(doc, EntityKind::Product, product_id)?;
            entry["name"] = json!(input.name);
            entry["size"] = json!(input.size);
            entry["price"] = json!(input.price);
            entry["image"] = json!(input.image);
            Ok(())
        })
    }

    /// Delete a product and every item referencing it.
    pub fn delete_product(&mut self, product_id: &str) -> RepositoryResult<()> {
        self.mutate("delete_product", |doc| {
            require(doc, EntityKind::Product, product_id)?;
            remove_where(doc, EntityKind::Product, |e| entry_id(e) == Some(product_id))?;
            remove_where(doc, EntityKind::InventoryItem, |e| {
                str_field(e, "refProduct") == Some(product_id)
            })?;
            Ok(())
        })
    }

    /// Create a shelf in `store_id`. The shelf takes the store's location.
    pub fn create_shelf(&mut self, store_id: &str, input: ShelfInput) -> RepositoryResult<String> {
        self.mutate("create_shelf", |doc| {
            let location = doc
                .get(EntityKind::Store, store_id)
                .ok_or_else(|| does_not_exist(EntityKind::Store, store_id))?
                .get("location")
                .cloned();

            let id = next_id(EntityKind::Shelf, doc.entries(EntityKind::Shelf))?;
            let mut entry = to_value(&Shelf {
                id: id.clone(),
                kind: EntityKind::Shelf.type_name().into(),
                name: input.name,
                location: None,
                max_capacity: input.max_capacity,
                ref_store: store_id.to_owned(),
            })?;
            if let (Some(location), Some(map)) = (location, entry.as_object_mut()) {
                map.insert("location".into(), location);
            }
            doc.entries_mut(EntityKind::Shelf)?.push(entry);
            Ok(id)
        })
    }

    pub fn update_shelf(&mut self, shelf_id: &str, input: ShelfInput) -> RepositoryResult<()> {
        self.mutate("update_shelf", |doc| {
            let entry = existing(doc, EntityKind::Shelf, shelf_id)?;
            entry["name"] = json!(input.name);
            entry["maxCapacity"] = json!(input.max_capacity);
            Ok(())
        })
    }

    /// Delete a shelf and every item on it.
    pub fn delete_shelf(&mut self, shelf_id: &str) -> RepositoryResult<()> {
        self.mutate("delete_shelf", |doc| {
            require(doc, EntityKind::Shelf, shelf_id)?;
            remove_where(doc, EntityKind::Shelf, |e| entry_id(e) == Some(shelf_id))?;
            remove_where(doc, EntityKind::InventoryItem, |e| {
                str_field(e, "refShelf") == Some(shelf_id)
            })?;
            Ok(())
        })
    }

    /// Create an inventory item. Dangling or inconsistent references are
    /// reported by validation of the resulting document.
    pub fn create_inventory_item(&mut self, input: InventoryItemInput) -> RepositoryResult<String> {
        self.mutate("create_inventory_item", |doc| {
            let id = next_id(EntityKind::InventoryItem, doc.entries(EntityKind::InventoryItem))?;
            let item = InventoryItem {
                id: id.clone(),
                kind: EntityKind::InventoryItem.type_name().into(),
                ref_product: input.product_id,
                ref_store: input.store_id,
                ref_shelf: input.shelf_id,
                stock_count: input.stock.stock_count,
                shelf_count: input.stock.shelf_count,
            };
            insert(doc, EntityKind::InventoryItem, &item)?;
            Ok(id)
        })
    }

    pub fn update_inventory_item(&mut self, item_id: &str, stock: StockInput) -> RepositoryResult<()> {
        self.mutate("update_inventory_item", |doc| {
            let entry = existing(doc, EntityKind::InventoryItem, item_id)?;
            entry["stockCount"] = json!(stock.stock_count);
            entry["shelfCount"] = json!(stock.shelf_count);
            Ok(())
        })
    }

    pub fn delete_inventory_item(&mut self, item_id: &str) -> RepositoryResult<()> {
        self.mutate("delete_inventory_item", |doc| {
            require(doc, EntityKind::InventoryItem, item_id)?;
            remove_where(doc, EntityKind::InventoryItem, |e| entry_id(e) == Some(item_id))?;
            Ok(())
        })
    }
}

/// Typed caches built from one document, not yet installed.
struct Loaded {
    stores: HashMap<String, Store>,
    shelves: HashMap<String, Shelf>,
    products: HashMap<String, Product>,
    inventory: Vec<InventoryItem>,
    issues: Vec<Issue>,
    shelf_loads: BTreeMap<String, i64>,
}

impl Loaded {
    fn build(document: &SeedDocument) -> RepositoryResult<Self> {
        let (issues, shelf_loads) = collect_issues(document).into_parts();
        Ok(Self {
            stores: keyed(document, EntityKind::Store, Store::from_json)?,
            shelves: keyed(document, EntityKind::Shelf, Shelf::from_json)?,
            products: keyed(document, EntityKind::Product, Product::from_json)?,
            inventory: document
                .entries(EntityKind::InventoryItem)
                .iter()
                .map(InventoryItem::from_json)
                .collect::<Result<Vec<_>, _>>()?,
            issues,
            shelf_loads,
        })
    }
}

/// JSON has no encoding for NaN or infinity, so such coordinates never reach the file.
fn store_location(input: &StoreInput) -> RepositoryResult<GeoPoint> {
    if input.longitude.is_finite() && input.latitude.is_finite() {
        Ok(GeoPoint::new(input.longitude, input.latitude))
    } else {
        Err(ValidationFailure::single(format!(
            "Store coordinates must be finite numbers ({}, {}).",
            input.latitude, input.longitude
        ))
        .into())
    }
}

fn keyed<T>(
    document: &SeedDocument,
    kind: EntityKind,
    build: impl Fn(&Value) -> Result<T, rdv_types::ModelError>,
) -> RepositoryResult<HashMap<String, T>> {
    document
        .entries(kind)
        .iter()
        .map(|entry| -> RepositoryResult<(String, T)> {
            let entity = build(entry)?;
            let id = entry_id(entry).unwrap_or_default().to_owned();
            Ok((id, entity))
        })
        .collect()
}

fn sorted_by_name<'a, T, K: Ord>(
    entities: impl Iterator<Item = &'a T>,
    key: impl Fn(&'a T) -> K,
) -> Vec<&'a T> {
    let mut list: Vec<&T> = entities.collect();
    list.sort_by_key(|e| key(*e));
    list
}

fn not_available() -> String {
    NOT_AVAILABLE.to_owned()
}

fn does_not_exist(kind: EntityKind, id: &str) -> ValidationFailure {
    ValidationFailure::single(format!("{kind} {id} does not exist"))
}

fn require(doc: &SeedDocument, kind: EntityKind, id: &str) -> RepositoryResult<()> {
    if doc.contains(kind, id) {
        Ok(())
    } else {
        Err(does_not_exist(kind, id).into())
    }
}

fn existing<'d>(doc: &'d mut SeedDocument, kind: EntityKind, id: &str) -> RepositoryResult<&'d mut Value> {
    doc.get_mut(kind, id)?
        .ok_or_else(|| does_not_exist(kind, id).into())
}

fn to_value<T: Serialize>(entity: &T) -> RepositoryResult<Value> {
    Ok(serde_json::to_value(entity)?)
}

fn insert<T: Serialize>(doc: &mut SeedDocument, kind: EntityKind, entity: &T) -> RepositoryResult<()> {
    let entry = to_value(entity)?;
    doc.entries_mut(kind)?.push(entry);
    Ok(())
}

fn remove_where(
    doc: &mut SeedDocument,
    kind: EntityKind,
    mut remove: impl FnMut(&Value) -> bool,
) -> RepositoryResult<usize> {
    let entries = doc.entries_mut(kind)?;
    let before = entries.len();
    entries.retain(|e| !remove(e));
    Ok(before - entries.len())
}
