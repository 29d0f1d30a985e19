//! Whole-document validation.
//!
//! [`collect_issues`] scans a [`SeedDocument`] and reports every problem it
//! finds, never stopping at the first one. Rules run in a fixed order and
//! that order is the order of the messages:
//!
//! 1. minimum number of stores, shelves, and products
//! 2. store image URLs
//! 3. shelf store references and capacities
//! 4. shelves per store (soft)
//! 5. product image URLs
//! 6. inventory item counts and references
//! 7. shelf load aggregation
//! 8. shelf overcapacity, then items per shelf (soft)
//!
//! Soft issues are reported but never block a mutation.

use std::collections::{BTreeMap, HashMap, HashSet};

use rdv_types::EntityKind;
use serde_json::Value;
use url::Url;

use crate::document::{entry_id, str_field, SeedDocument};

pub const MIN_STORES: usize = 4;
pub const MIN_SHELVES: usize = 16;
pub const MIN_PRODUCTS: usize = 10;
pub const MIN_SHELVES_PER_STORE: usize = 4;
pub const MIN_ITEMS_PER_SHELF: usize = 2;

/// Whether an issue blocks mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Blocking,
    Soft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueKind {
    TooFewEntities,
    InvalidImage,
    MissingReference,
    InvalidCapacity,
    StoreBelowShelfMinimum,
    InvalidCount,
    ShelfCountExceedsStock,
    StoreMismatch,
    OverCapacity,
    ShelfBelowItemMinimum,
}

impl IssueKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::StoreBelowShelfMinimum | Self::ShelfBelowItemMinimum => Severity::Soft,
            _ => Severity::Blocking,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    fn new(kind: IssueKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_blocking(&self) -> bool {
        self.severity() == Severity::Blocking
    }
}

/// Outcome of a validation scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<Issue>,
    shelf_loads: BTreeMap<String, i64>,
}

impl ValidationReport {
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// All messages in rule order.
    pub fn warnings(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }

    pub fn blocking_messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .filter(|i| i.is_blocking())
            .map(|i| i.message.clone())
            .collect()
    }

    pub fn has_blocking(&self) -> bool {
        self.issues.iter().any(Issue::is_blocking)
    }

    /// Sum of `shelfCount` per referenced shelf id.
    pub fn shelf_loads(&self) -> &BTreeMap<String, i64> {
        &self.shelf_loads
    }

    pub fn into_parts(self) -> (Vec<Issue>, BTreeMap<String, i64>) {
        (self.issues, self.shelf_loads)
    }
}

/// Scan the whole document and collect every issue plus the shelf loads.
pub fn collect_issues(document: &SeedDocument) -> ValidationReport {
    let stores = document.entries(EntityKind::Store);
    let shelves = document.entries(EntityKind::Shelf);
    let products = document.entries(EntityKind::Product);
    let items = document.entries(EntityKind::InventoryItem);

    let store_ids = ids(stores);
    let product_ids = ids(products);
    let shelf_stores: HashMap<&str, Option<&str>> = shelves
        .iter()
        .filter_map(|s| entry_id(s).map(|id| (id, str_field(s, "refStore"))))
        .collect();

    let mut issues = Vec::new();

    for (kind, entries, minimum) in [
        (EntityKind::Store, stores, MIN_STORES),
        (EntityKind::Shelf, shelves, MIN_SHELVES),
        (EntityKind::Product, products, MIN_PRODUCTS),
    ] {
        if entries.len() < minimum {
            issues.push(Issue::new(
                IssueKind::TooFewEntities,
                format!(
                    "Dataset has {} {} entries; at least {minimum} are required.",
                    entries.len(),
                    kind
                ),
            ));
        }
    }

    for store in stores {
        check_image(EntityKind::Store, store, &mut issues);
    }

    for shelf in shelves {
        let id = display_id(shelf);
        let ref_store = shelf.get("refStore").unwrap_or(&Value::Null);
        if !ref_store.as_str().is_some_and(|s| store_ids.contains(s)) {
            issues.push(Issue::new(
                IssueKind::MissingReference,
                format!("Shelf {id} references missing Store {}.", display_value(ref_store)),
            ));
        }
        let capacity = shelf.get("maxCapacity").unwrap_or(&Value::Null);
        if non_negative(capacity).is_none() {
            issues.push(Issue::new(
                IssueKind::InvalidCapacity,
                format!(
                    "Shelf {id} has invalid maxCapacity ({}); expected an integer >= 0.",
                    display_json(capacity)
                ),
            ));
        }
    }

    for store in stores {
        let Some(store_id) = entry_id(store) else {
            continue;
        };
        let count = shelves
            .iter()
            .filter(|s| str_field(s, "refStore") == Some(store_id))
            .count();
        if count < MIN_SHELVES_PER_STORE {
            issues.push(Issue::new(
                IssueKind::StoreBelowShelfMinimum,
                format!(
                    "Store {store_id} has {count} shelves; at least {MIN_SHELVES_PER_STORE} are expected."
                ),
            ));
        }
    }

    for product in products {
        check_image(EntityKind::Product, product, &mut issues);
    }

    for item in items {
        check_item(item, &store_ids, &shelf_stores, &product_ids, &mut issues);
    }

    let mut shelf_loads: BTreeMap<String, i64> = BTreeMap::new();
    let mut item_counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        let Some(shelf_id) = str_field(item, "refShelf") else {
            continue;
        };
        *item_counts.entry(shelf_id).or_default() += 1;
        if let Some(count) = item.get("shelfCount").and_then(Value::as_i64) {
            let load = shelf_loads.entry(shelf_id.to_owned()).or_default();
            *load = load.saturating_add(count);
        }
    }

    for shelf in shelves {
        let Some(shelf_id) = entry_id(shelf) else {
            continue;
        };
        let load = shelf_loads.get(shelf_id).copied().unwrap_or(0);
        if let Some(capacity) = shelf.get("maxCapacity").and_then(non_negative) {
            if load > capacity {
                let name = str_field(shelf, "name").unwrap_or(shelf_id);
                issues.push(Issue::new(
                    IssueKind::OverCapacity,
                    format!("Shelf {name} ({shelf_id}) exceeds maxCapacity ({load}/{capacity})."),
                ));
            }
        }
        let count = item_counts.get(shelf_id).copied().unwrap_or(0);
        if count < MIN_ITEMS_PER_SHELF {
            issues.push(Issue::new(
                IssueKind::ShelfBelowItemMinimum,
                format!(
                    "Shelf {shelf_id} has {count} inventory items; at least {MIN_ITEMS_PER_SHELF} are expected."
                ),
            ));
        }
    }

    ValidationReport {
        issues,
        shelf_loads,
    }
}

fn check_item(
    item: &Value,
    store_ids: &HashSet<&str>,
    shelf_stores: &HashMap<&str, Option<&str>>,
    product_ids: &HashSet<&str>,
    issues: &mut Vec<Issue>,
) {
    let id = display_id(item);

    let stock = counted_field(item, "stockCount", &id, issues);
    let on_shelf = counted_field(item, "shelfCount", &id, issues);
    if let (Some(stock), Some(on_shelf)) = (stock, on_shelf) {
        if on_shelf > stock {
            issues.push(Issue::new(
                IssueKind::ShelfCountExceedsStock,
                format!("InventoryItem {id} has shelfCount > stockCount ({on_shelf}>{stock})."),
            ));
        }
    }

    let ref_store = str_field(item, "refStore");
    let ref_shelf = str_field(item, "refShelf");

    for (kind, field, known) in [
        (EntityKind::Store, "refStore", ref_store.is_some_and(|s| store_ids.contains(s))),
        (EntityKind::Shelf, "refShelf", ref_shelf.is_some_and(|s| shelf_stores.contains_key(s))),
        (
            EntityKind::Product,
            "refProduct",
            str_field(item, "refProduct").is_some_and(|p| product_ids.contains(p)),
        ),
    ] {
        if !known {
            let target = display_value(item.get(field).unwrap_or(&Value::Null));
            issues.push(Issue::new(
                IssueKind::MissingReference,
                format!("InventoryItem {id} references missing {kind} {target}."),
            ));
        }
    }

    if let Some(shelf_id) = ref_shelf {
        if let Some(owner) = shelf_stores.get(shelf_id) {
            if *owner != ref_store {
                issues.push(Issue::new(
                    IssueKind::StoreMismatch,
                    format!(
                        "InventoryItem {id} is on Shelf {shelf_id} of Store {}, not Store {}.",
                        owner.unwrap_or("N/A"),
                        ref_store.unwrap_or("N/A")
                    ),
                ));
            }
        }
    }
}

fn counted_field(item: &Value, field: &str, id: &str, issues: &mut Vec<Issue>) -> Option<i64> {
    let value = item.get(field).unwrap_or(&Value::Null);
    let count = non_negative(value);
    if count.is_none() {
        issues.push(Issue::new(
            IssueKind::InvalidCount,
            format!(
                "InventoryItem {id} has invalid {field} ({}); expected an integer >= 0.",
                display_json(value)
            ),
        ));
    }
    count
}

fn check_image(kind: EntityKind, entry: &Value, issues: &mut Vec<Issue>) {
    let image = str_field(entry, "image").unwrap_or("");
    if !is_http_url(image) {
        issues.push(Issue::new(
            IssueKind::InvalidImage,
            format!(
                "{kind} {} has a missing or invalid image URL ({image:?}).",
                display_id(entry)
            ),
        ));
    }
}

/// An absolute `http`/`https` URL with a host.
pub fn is_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

fn non_negative(value: &Value) -> Option<i64> {
    value.as_i64().filter(|n| *n >= 0)
}

fn ids(entries: &[Value]) -> HashSet<&str> {
    entries.iter().filter_map(entry_id).collect()
}

fn display_id(entry: &Value) -> String {
    entry_id(entry).map_or_else(|| "<no id>".to_owned(), str::to_owned)
}

/// JSON rendering, so a quoted `"3"` is distinguishable from `3`.
fn display_json(value: &Value) -> String {
    match value {
        Value::Null => "<none>".into(),
        other => other.to_string(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<none>".into(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    fn doc(value: Value) -> SeedDocument {
        SeedDocument::from_value(value).unwrap()
    }

    #[test]
    fn valid_fixture_has_no_issues() {
        let report = collect_issues(&fixtures::valid_document());
        assert_eq!(report.warnings(), Vec::<String>::new());
        assert_eq!(report.shelf_loads().len(), 16);
    }

    #[test]
    fn empty_document_reports_cardinality_in_order() {
        let report = collect_issues(&doc(json!({})));
        assert_eq!(
            report.warnings(),
            vec![
                "Dataset has 0 Store entries; at least 4 are required.",
                "Dataset has 0 Shelf entries; at least 16 are required.",
                "Dataset has 0 Product entries; at least 10 are required.",
            ]
        );
        assert!(report.has_blocking());
    }

    #[test]
    fn overcapacity_example() {
        let report = collect_issues(&doc(json!({
            "stores": [{"id": "st", "name": "S", "address": "a", "image": "https://x.io/s.png"}],
            "shelves": [{"id": "sh", "name": "Top", "maxCapacity": 10, "refStore": "st"}],
            "products": [{"id": "p", "name": "P", "price": 1, "size": "M", "image": "https://x.io/p.png"}],
            "inventoryItems": [
                {"id": "i1", "refProduct": "p", "refStore": "st", "refShelf": "sh", "stockCount": 6, "shelfCount": 6},
                {"id": "i2", "refProduct": "p", "refStore": "st", "refShelf": "sh", "stockCount": 9, "shelfCount": 5},
            ],
        })));
        assert_eq!(report.shelf_loads().get("sh"), Some(&11));
        let over: Vec<_> = report
            .issues()
            .iter()
            .filter(|i| i.kind == IssueKind::OverCapacity)
            .collect();
        assert_eq!(over.len(), 1);
        assert!(over[0].message.contains("11/10"));
        assert!(over[0].is_blocking());
    }

    #[test]
    fn huge_shelf_counts_saturate_the_load() {
        let huge = i64::MAX;
        let report = collect_issues(&doc(json!({
            "shelves": [{"id": "sh", "name": "Top", "maxCapacity": 10, "refStore": "st"}],
            "inventoryItems": [
                {"id": "i1", "refProduct": "p", "refStore": "st", "refShelf": "sh", "stockCount": huge, "shelfCount": huge},
                {"id": "i2", "refProduct": "p", "refStore": "st", "refShelf": "sh", "stockCount": huge, "shelfCount": huge},
            ],
        })));
        assert_eq!(report.shelf_loads().get("sh"), Some(&i64::MAX));
        assert!(report
            .issues()
            .iter()
            .any(|i| i.kind == IssueKind::OverCapacity && i.message.contains(&format!("{huge}/10"))));
    }

    #[test]
    fn empty_store_image_flags_only_that_store() {
        let mut value = fixtures::valid_value();
        value["stores"][2]["image"] = json!("");
        let report = collect_issues(&doc(value));
        assert_eq!(
            report.warnings(),
            vec![r#"Store urn:ngsi-ld:Store:003 has a missing or invalid image URL ("")."#]
        );
    }

    #[test]
    fn image_urls_must_be_absolute_http() {
        assert!(is_http_url("https://example.com/a.jpg"));
        assert!(is_http_url("http://example.com"));
        assert!(!is_http_url(""));
        assert!(!is_http_url("/static/a.jpg"));
        assert!(!is_http_url("ftp://example.com/a.jpg"));
        assert!(!is_http_url("data:image/png;base64,AAAA"));
    }

    #[test]
    fn item_rules_report_every_problem() {
        let mut value = fixtures::valid_value();
        value["inventoryItems"][0] = json!({
            "id": "urn:ngsi-ld:InventoryItem:001",
            "refProduct": "urn:ngsi-ld:Product:999",
            "refStore": "urn:ngsi-ld:Store:002",
            "refShelf": "urn:ngsi-ld:Shelf:001",
            "stockCount": -1,
            "shelfCount": "3",
        });
        let report = collect_issues(&doc(value));
        let item_messages: Vec<_> = report
            .warnings()
            .into_iter()
            .filter(|m| m.starts_with("InventoryItem urn:ngsi-ld:InventoryItem:001"))
            .collect();
        assert_eq!(
            item_messages,
            vec![
                "InventoryItem urn:ngsi-ld:InventoryItem:001 has invalid stockCount (-1); expected an integer >= 0.",
                "InventoryItem urn:ngsi-ld:InventoryItem:001 has invalid shelfCount (\"3\"); expected an integer >= 0.",
                "InventoryItem urn:ngsi-ld:InventoryItem:001 references missing Product urn:ngsi-ld:Product:999.",
                "InventoryItem urn:ngsi-ld:InventoryItem:001 is on Shelf urn:ngsi-ld:Shelf:001 of Store urn:ngsi-ld:Store:001, not Store urn:ngsi-ld:Store:002.",
            ]
        );
    }

    #[test]
    fn shelf_count_above_stock_is_blocking() {
        let mut value = fixtures::valid_value();
        value["inventoryItems"][5]["shelfCount"] = json!(100);
        value["inventoryItems"][5]["stockCount"] = json!(20);
        let report = collect_issues(&doc(value));
        let issue = report
            .issues()
            .iter()
            .find(|i| i.kind == IssueKind::ShelfCountExceedsStock)
            .unwrap();
        assert!(issue.message.contains("urn:ngsi-ld:InventoryItem:006"));
        assert!(issue.message.contains("100>20"));
        assert!(issue.is_blocking());
    }

    #[test]
    fn dangling_shelf_store_and_bad_capacity() {
        let mut value = fixtures::valid_value();
        value["shelves"][0]["refStore"] = json!("urn:ngsi-ld:Store:404");
        value["shelves"][1]["maxCapacity"] = json!(2.5);
        let report = collect_issues(&doc(value));
        let warnings = report.warnings();
        assert!(warnings.contains(
            &"Shelf urn:ngsi-ld:Shelf:001 references missing Store urn:ngsi-ld:Store:404.".to_owned()
        ));
        assert!(warnings.contains(
            &"Shelf urn:ngsi-ld:Shelf:002 has invalid maxCapacity (2.5); expected an integer >= 0."
                .to_owned()
        ));
        // Store 001 drops to three shelves.
        assert!(report
            .issues()
            .iter()
            .any(|i| i.kind == IssueKind::StoreBelowShelfMinimum && !i.is_blocking()));
    }

    #[test]
    fn soft_issues_do_not_block() {
        let mut value = fixtures::valid_value();
        let items = value["inventoryItems"].as_array_mut().unwrap();
        items.retain(|item| item["refShelf"] != "urn:ngsi-ld:Shelf:016");
        let report = collect_issues(&doc(value));
        assert_eq!(
            report.warnings(),
            vec!["Shelf urn:ngsi-ld:Shelf:016 has 0 inventory items; at least 2 are expected."]
        );
        assert!(!report.has_blocking());
        assert!(report.blocking_messages().is_empty());
    }

    #[test]
    fn loads_sum_shelf_counts_including_dangling_shelves() {
        let mut value = fixtures::valid_value();
        value["inventoryItems"].as_array_mut().unwrap().push(json!({
            "id": "urn:ngsi-ld:InventoryItem:099",
            "refProduct": "urn:ngsi-ld:Product:001",
            "refStore": "urn:ngsi-ld:Store:001",
            "refShelf": "urn:ngsi-ld:Shelf:777",
            "stockCount": 4,
            "shelfCount": 3,
        }));
        let report = collect_issues(&doc(value));
        assert_eq!(report.shelf_loads().get("urn:ngsi-ld:Shelf:777"), Some(&3));
        assert_eq!(
            report.shelf_loads().get("urn:ngsi-ld:Shelf:001"),
            Some(&(2 * fixtures::SHELF_COUNT))
        );
    }

    #[test]
    fn severity_split() {
        assert_eq!(IssueKind::StoreBelowShelfMinimum.severity(), Severity::Soft);
        assert_eq!(IssueKind::ShelfBelowItemMinimum.severity(), Severity::Soft);
        assert_eq!(IssueKind::TooFewEntities.severity(), Severity::Blocking);
        assert_eq!(IssueKind::OverCapacity.severity(), Severity::Blocking);
    }
}
