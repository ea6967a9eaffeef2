//! Schema definition types.
//!
//! Collections and link types carry attribute definitions together with the
//! derived bookkeeping the committer maintains (attribute usage counters,
//! document and link counts).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AttributeId, CollectionId, LinkTypeId};

/// Value constraint attached to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Text,
    Number,
    Boolean,
    /// Fraction stored as a number, displayed as "45%".
    Percentage,
    /// Instant stored as milliseconds since the Unix epoch.
    DateTime,
}

/// Attribute definition within a collection or link type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    pub constraint: Option<Constraint>,
    /// Number of entities that have ever introduced a value for this attribute.
    pub usage_count: u64,
}

impl Attribute {
    pub fn new(id: impl Into<AttributeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            constraint: None,
            usage_count: 0,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_usage_count(mut self, usage_count: u64) -> Self {
        self.usage_count = usage_count;
        self
    }
}

/// What a collection is used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPurpose {
    #[default]
    None,
    /// Documents are tasks; data changes are reported to the purpose-change processor.
    Tasks,
}

/// A collection of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub purpose: CollectionPurpose,
    pub last_time_used: Option<DateTime<Utc>>,
    /// Computed by the store on read.
    pub documents_count: u64,
}

impl Collection {
    pub fn new(id: impl Into<CollectionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: Vec::new(),
            purpose: CollectionPurpose::None,
            last_time_used: None,
            documents_count: 0,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_purpose(mut self, purpose: CollectionPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// Get an attribute definition by id.
    pub fn attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id.as_str() == id)
    }

    pub fn is_task_list(&self) -> bool {
        self.purpose == CollectionPurpose::Tasks
    }
}

/// A link type connecting documents of two collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkType {
    pub id: LinkTypeId,
    pub name: String,
    pub collection_ids: [CollectionId; 2],
    pub attributes: Vec<Attribute>,
    /// Computed by the store on read.
    pub links_count: u64,
}

impl LinkType {
    pub fn new(
        id: impl Into<LinkTypeId>,
        name: impl Into<String>,
        collection_ids: [CollectionId; 2],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            collection_ids,
            attributes: Vec::new(),
            links_count: 0,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Get an attribute definition by id.
    pub fn attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_attribute_lookup() {
        let collection = Collection::new("c1", "Tasks")
            .with_attribute(Attribute::new("a1", "Title"))
            .with_attribute(Attribute::new("a2", "Due").with_constraint(Constraint::DateTime));

        assert_eq!(collection.attribute("a2").map(|a| a.name.as_str()), Some("Due"));
        assert!(collection.attribute("a3").is_none());
        assert!(!collection.is_task_list());
    }

    #[test]
    fn test_constraint_serialization() {
        let json = serde_json::to_string(&Constraint::DateTime).unwrap();

        assert_eq!(json, "\"date_time\"");
    }
}
