use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace shared by every entity id: `urn:ngsi-ld:<Type>:<NNN>`.
const URN_NAMESPACE: &str = "urn:ngsi-ld";

/// Minimum width of the numeric id suffix.
const SUFFIX_WIDTH: usize = 3;

/// The four entity types stored in a seed document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Store,
    Shelf,
    Product,
    InventoryItem,
}

impl EntityKind {
    /// All kinds in document order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Store,
        EntityKind::Shelf,
        EntityKind::Product,
        EntityKind::InventoryItem,
    ];

    /// The value of the `type` field, also used as the default when absent.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Store => "Store",
            Self::Shelf => "Shelf",
            Self::Product => "Product",
            Self::InventoryItem => "InventoryItem",
        }
    }

    /// Key of the top-level array holding entities of this kind.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Store => "stores",
            Self::Shelf => "shelves",
            Self::Product => "products",
            Self::InventoryItem => "inventoryItems",
        }
    }

    /// Id prefix including the trailing colon, e.g. `urn:ngsi-ld:Store:`.
    pub fn id_prefix(self) -> String {
        format!("{URN_NAMESPACE}:{}:", self.type_name())
    }

    /// Build the id for the given sequence number, zero padded to three digits.
    pub fn format_id(self, number: u64) -> String {
        format!("{}{number:0width$}", self.id_prefix(), width = SUFFIX_WIDTH)
    }

    /// Extract the numeric suffix of an id of this kind.
    ///
    /// Returns `None` when the id does not follow the fixed
    /// `urn:ngsi-ld:<Type>:<digits>` pattern.
    pub fn parse_suffix(self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(&self.id_prefix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
