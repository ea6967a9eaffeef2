//! Correlation resolver.
//!
//! Maps the provisional ids of entities created in a batch to the real ids the
//! store assigned. A reference with no mapping is taken as a real id.

use std::collections::HashMap;

use cascade_core::{CorrelationId, Document, DocumentId, LinkId, LinkInstance, TemplateId};
use cascade_operation::{DocumentRef, LinkRef};

#[derive(Debug, Clone, Default)]
pub struct CorrelationResolver {
    documents: HashMap<CorrelationId, DocumentId>,
    links: HashMap<TemplateId, LinkId>,
}

impl CorrelationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register created documents that carry a correlation id.
    pub fn register_documents<'a>(&mut self, created: impl IntoIterator<Item = &'a Document>) {
        for document in created {
            if let Some(correlation_id) = &document.correlation_id {
                self.documents
                    .insert(correlation_id.clone(), document.id.clone());
            }
        }
    }

    /// Register created links that carry a template id.
    pub fn register_links<'a>(&mut self, created: impl IntoIterator<Item = &'a LinkInstance>) {
        for link in created {
            if let Some(template_id) = &link.template_id {
                self.links.insert(template_id.clone(), link.id.clone());
            }
        }
    }

    pub fn resolve_document(&self, correlation_id: &CorrelationId) -> Option<&DocumentId> {
        self.documents.get(correlation_id)
    }

    pub fn resolve_link(&self, template_id: &TemplateId) -> Option<&LinkId> {
        self.links.get(template_id)
    }

    /// The real id a document reference points to.
    pub fn document_id(&self, reference: &DocumentRef) -> DocumentId {
        match reference {
            DocumentRef::Existing(id) => id.clone(),
            DocumentRef::Pending(correlation_id) => self
                .resolve_document(correlation_id)
                .cloned()
                .unwrap_or_else(|| DocumentId::new(correlation_id.as_str())),
        }
    }

    /// The real id a link reference points to.
    pub fn link_id(&self, reference: &LinkRef) -> LinkId {
        match reference {
            LinkRef::Existing(id) => id.clone(),
            LinkRef::Pending(template_id) => self
                .resolve_link(template_id)
                .cloned()
                .unwrap_or_else(|| LinkId::new(template_id.as_str())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::data;

    #[test]
    fn test_resolves_registered_documents() {
        // GIVEN
        let mut document = Document::new("d7".into(), "c1".into(), data!());
        document.correlation_id = Some(CorrelationId::new("corr-1"));
        let mut resolver = CorrelationResolver::new();

        // WHEN
        resolver.register_documents([&document]);

        // THEN
        assert_eq!(
            resolver.document_id(&DocumentRef::pending("corr-1")),
            DocumentId::new("d7")
        );
        assert_eq!(
            resolver.document_id(&DocumentRef::existing("d2")),
            DocumentId::new("d2")
        );
    }

    #[test]
    fn test_unmapped_reference_passes_through() {
        let resolver = CorrelationResolver::new();

        assert_eq!(
            resolver.document_id(&DocumentRef::pending("D9")),
            DocumentId::new("D9")
        );
        assert_eq!(resolver.link_id(&LinkRef::pending("t1")), LinkId::new("t1"));
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_resolves_registered_links() {
        let mut link = LinkInstance::new("l3".into(), "lt1".into(), ["d1".into(), "d2".into()], data!());
        link.template_id = Some(TemplateId::new("t1"));
        let mut resolver = CorrelationResolver::new();

        resolver.register_links([&link]);

        assert_eq!(resolver.resolve_link(&TemplateId::new("t1")), Some(&LinkId::new("l3")));
        assert_eq!(resolver.link_id(&LinkRef::pending("t1")), LinkId::new("l3"));
    }
}
