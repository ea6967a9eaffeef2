//! Commit stages and the per-commit schema state they share.

mod documents;
mod finish;
mod links;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::slice;

use indexmap::IndexMap;

use cascade_core::{Attribute, AttributeId, Collection, CollectionId, LinkType, LinkTypeId};
use cascade_operation::{Operation, Violation, Violations};
use cascade_store::{Store, StoreError, StoreResult};

/// Collections and link types as first read during this commit.
///
/// Used for attribute definitions and purpose only; counter changes live in
/// `UsageCounters` and are applied to fresh reads at write-back.
#[derive(Debug, Default)]
pub(crate) struct SchemaSnapshot {
    collections: HashMap<CollectionId, Collection>,
    link_types: HashMap<LinkTypeId, LinkType>,
}

impl SchemaSnapshot {
    /// Load every collection and link type the batch names. Operations naming
    /// one the store does not know are returned as violations.
    pub(crate) fn load(
        store: &dyn Store,
        operations: &[Operation],
    ) -> StoreResult<(Self, Violations)> {
        let mut collection_ids: Vec<CollectionId> = Vec::new();
        let mut link_type_ids: Vec<LinkTypeId> = Vec::new();
        for operation in operations {
            if let Some(id) = operation.collection_id() {
                if !collection_ids.contains(id) {
                    collection_ids.push(id.clone());
                }
            }
            if let Some(id) = operation.link_type_id() {
                if !link_type_ids.contains(id) {
                    link_type_ids.push(id.clone());
                }
            }
        }

        let mut snapshot = Self::default();
        if !collection_ids.is_empty() {
            for collection in store.collections_by_ids(&collection_ids)? {
                snapshot.collections.insert(collection.id.clone(), collection);
            }
        }
        if !link_type_ids.is_empty() {
            for link_type in store.link_types_by_ids(&link_type_ids)? {
                snapshot.link_types.insert(link_type.id.clone(), link_type);
            }
        }

        let mut violations = Violations::new();
        for (index, operation) in operations.iter().enumerate() {
            if let Some(id) = operation.collection_id() {
                if !snapshot.collections.contains_key(id) {
                    violations.push(Violation::for_operation(
                        index,
                        operation.to_string(),
                        format!("unknown collection {id}"),
                    ));
                }
            }
            if let Some(id) = operation.link_type_id() {
                if !snapshot.link_types.contains_key(id) {
                    violations.push(Violation::for_operation(
                        index,
                        operation.to_string(),
                        format!("unknown link type {id}"),
                    ));
                }
            }
        }
        Ok((snapshot, violations))
    }

    pub(crate) fn collection(
        &mut self,
        store: &dyn Store,
        id: &CollectionId,
    ) -> StoreResult<Collection> {
        if let Some(collection) = self.collections.get(id) {
            return Ok(collection.clone());
        }
        let collection = store
            .collections_by_ids(slice::from_ref(id))?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::CollectionNotFound(id.clone()))?;
        self.collections.insert(id.clone(), collection.clone());
        Ok(collection)
    }

    pub(crate) fn link_type(&mut self, store: &dyn Store, id: &LinkTypeId) -> StoreResult<LinkType> {
        if let Some(link_type) = self.link_types.get(id) {
            return Ok(link_type.clone());
        }
        let link_type = store
            .link_types_by_ids(slice::from_ref(id))?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::LinkTypeNotFound(id.clone()))?;
        self.link_types.insert(id.clone(), link_type.clone());
        Ok(link_type)
    }
}

/// Attribute usage increments accumulated during one commit.
#[derive(Debug, Default)]
pub(crate) struct UsageCounters {
    collections: IndexMap<CollectionId, BTreeMap<AttributeId, u64>>,
    link_types: IndexMap<LinkTypeId, BTreeMap<AttributeId, u64>>,
}

impl UsageCounters {
    /// Count one use of every defined attribute in `introduced`.
    pub(crate) fn introduce_in_collection(
        &mut self,
        collection: &Collection,
        introduced: &BTreeSet<String>,
    ) -> usize {
        let increments = self.collections.entry(collection.id.clone()).or_default();
        let counted = count_introduced(increments, &collection.attributes, introduced);
        if increments.is_empty() {
            self.collections.shift_remove(&collection.id);
        }
        counted
    }

    pub(crate) fn introduce_in_link_type(
        &mut self,
        link_type: &LinkType,
        introduced: &BTreeSet<String>,
    ) -> usize {
        let increments = self.link_types.entry(link_type.id.clone()).or_default();
        let counted = count_introduced(increments, &link_type.attributes, introduced);
        if increments.is_empty() {
            self.link_types.shift_remove(&link_type.id);
        }
        counted
    }

    pub(crate) fn collection_ids(&self) -> Vec<CollectionId> {
        self.collections.keys().cloned().collect()
    }

    pub(crate) fn link_type_ids(&self) -> Vec<LinkTypeId> {
        self.link_types.keys().cloned().collect()
    }

    pub(crate) fn apply_to_collection(&self, collection: &mut Collection) {
        if let Some(increments) = self.collections.get(&collection.id) {
            apply_increments(&mut collection.attributes, increments);
        }
    }

    pub(crate) fn apply_to_link_type(&self, link_type: &mut LinkType) {
        if let Some(increments) = self.link_types.get(&link_type.id) {
            apply_increments(&mut link_type.attributes, increments);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.collections.is_empty() && self.link_types.is_empty()
    }
}

fn count_introduced(
    increments: &mut BTreeMap<AttributeId, u64>,
    attributes: &[Attribute],
    introduced: &BTreeSet<String>,
) -> usize {
    let mut counted = 0;
    for attribute in attributes
        .iter()
        .filter(|a| introduced.contains(a.id.as_str()))
    {
        *increments.entry(attribute.id.clone()).or_insert(0) += 1;
        counted += 1;
    }
    counted
}

fn apply_increments(attributes: &mut [Attribute], increments: &BTreeMap<AttributeId, u64>) {
    for attribute in attributes {
        if let Some(increment) = increments.get(&attribute.id) {
            attribute.usage_count += increment;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_operation::{DocumentRef, DocumentRemove, DocumentUpdate, LinkRef, LinkRemove};
    use cascade_store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn collection() -> Collection {
        Collection::new("c1", "Tasks")
            .with_attribute(Attribute::new("a1", "Title"))
            .with_attribute(Attribute::new("a2", "State").with_usage_count(4))
    }

    #[test]
    fn test_counters_only_count_defined_attributes() {
        // GIVEN
        let mut counters = UsageCounters::default();
        let introduced: BTreeSet<String> = ["a2", "zz"].iter().map(|s| s.to_string()).collect();

        // WHEN
        let counted = counters.introduce_in_collection(&collection(), &introduced);
        let mut updated = collection();
        counters.apply_to_collection(&mut updated);

        // THEN
        assert_eq!(counted, 1);
        assert_eq!(updated.attribute("a2").map(|a| a.usage_count), Some(5));
        assert_eq!(updated.attribute("a1").map(|a| a.usage_count), Some(0));
    }

    #[test]
    fn test_nothing_introduced_leaves_no_entry() {
        let mut counters = UsageCounters::default();

        counters.introduce_in_collection(&collection(), &BTreeSet::new());

        assert!(counters.is_empty());
        assert!(counters.collection_ids().is_empty());
    }

    #[test]
    fn test_load_flags_unknown_schema_per_operation() {
        // GIVEN
        let store = MemoryStore::new();
        store.add_collection(collection()).unwrap();
        let operations: Vec<Operation> = vec![
            DocumentUpdate::new(DocumentRef::existing("d1"), "c1", "a1", 1).into(),
            DocumentRemove::new(DocumentRef::existing("d2"), "c404").into(),
            LinkRemove::new(LinkRef::existing("l1"), "lt404").into(),
        ];

        // WHEN
        let (mut snapshot, violations) = SchemaSnapshot::load(&store, &operations).unwrap();

        // THEN
        let indexes: Vec<_> = violations.all().iter().map(|v| v.index).collect();
        assert_eq!(indexes, vec![Some(1), Some(2)]);
        assert!(violations.all()[0].reason.contains("c404"));
        assert!(violations.all()[1].reason.contains("lt404"));
        assert_eq!(snapshot.collection(&store, &"c1".into()).unwrap().name, "Tasks");
    }

    #[test]
    fn test_snapshot_reports_missing_collection() {
        let store = MemoryStore::new();
        let mut snapshot = SchemaSnapshot::default();

        let result = snapshot.collection(&store, &"c404".into());

        assert!(matches!(result, Err(StoreError::CollectionNotFound(_))));
    }
}
