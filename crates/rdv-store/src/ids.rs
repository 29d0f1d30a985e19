use rdv_types::EntityKind;
use serde_json::Value;

use crate::document::entry_id;
use crate::error::{RepositoryResult, ValidationFailure};

/// Next id for `kind`: the largest numeric suffix among `entries` plus one.
///
/// Ids that do not follow the `urn:ngsi-ld:<Type>:<digits>` pattern are
/// ignored. Numbers freed by deleting anything but the current maximum are
/// never handed out again. Fails once the largest suffix is `u64::MAX`.
pub fn next_id(kind: EntityKind, entries: &[Value]) -> RepositoryResult<String> {
    let max = entries
        .iter()
        .filter_map(entry_id)
        .filter_map(|id| kind.parse_suffix(id))
        .max()
        .unwrap_or(0);
    let next = max
        .checked_add(1)
        .ok_or_else(|| ValidationFailure::single(format!("No {kind} id is left after {max}.")))?;
    Ok(kind.format_id(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn first_id_is_one() {
        assert_eq!(next_id(EntityKind::Store, &[]).unwrap(), "urn:ngsi-ld:Store:001");
    }

    #[test]
    fn uses_maximum_not_count() {
        let entries = vec![
            json!({"id": "urn:ngsi-ld:Shelf:002"}),
            json!({"id": "urn:ngsi-ld:Shelf:009"}),
            json!({"id": "urn:ngsi-ld:Shelf:004"}),
        ];
        assert_eq!(next_id(EntityKind::Shelf, &entries).unwrap(), "urn:ngsi-ld:Shelf:010");
    }

    #[test]
    fn ignores_foreign_and_malformed_ids() {
        let entries = vec![
            json!({"id": "urn:ngsi-ld:Product:003"}),
            json!({"id": "urn:ngsi-ld:Store:050"}),
            json!({"id": "urn:ngsi-ld:Product:abc"}),
            json!({"id": 77}),
            json!({"name": "no id"}),
        ];
        assert_eq!(next_id(EntityKind::Product, &entries).unwrap(), "urn:ngsi-ld:Product:004");
    }

    #[test]
    fn exhausted_suffix_is_a_validation_failure() {
        let entries = vec![json!({"id": format!("urn:ngsi-ld:Store:{}", u64::MAX)})];
        let err = next_id(EntityKind::Store, &entries).unwrap_err();
        assert_eq!(
            err.validation_messages(),
            Some(&[format!("No Store id is left after {}.", u64::MAX)][..])
        );
    }

    proptest! {
        #[test]
        fn result_is_max_plus_one(numbers in proptest::collection::vec(0u64..5000, 1..20)) {
            let entries: Vec<Value> = numbers
                .iter()
                .map(|n| json!({"id": EntityKind::InventoryItem.format_id(*n)}))
                .collect();
            let next = next_id(EntityKind::InventoryItem, &entries).unwrap();
            let max = numbers.iter().copied().max().unwrap();
            prop_assert_eq!(EntityKind::InventoryItem.parse_suffix(&next), Some(max + 1));
        }
    }
}
