//! Changes tracker.
//!
//! Net summary of one commit: entities created, updated and removed, the
//! collections and link types whose bookkeeping changed, and the side-effect
//! requests to deliver. Entities are stored with decoded (client form) data.
//!
//! An entity removed after being created in the same tracker is dropped from
//! "created" and appears once in "removed". An entity updated after being
//! created stays a creation carrying its latest data.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use cascade_core::{
    Collection, CollectionId, Document, DocumentId, LinkId, LinkInstance, LinkType, LinkTypeId,
};
use cascade_operation::{
    NavigationRequest, PrintRequest, SendEmailRequest, SideEffectRequest, UserMessageRequest,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangesTracker {
    created_documents: IndexMap<DocumentId, Document>,
    updated_documents: IndexMap<DocumentId, Document>,
    removed_documents: IndexMap<DocumentId, Document>,
    created_links: IndexMap<LinkId, LinkInstance>,
    updated_links: IndexMap<LinkId, LinkInstance>,
    removed_links: IndexMap<LinkId, LinkInstance>,
    /// Collections whose counts or counters changed.
    collections: IndexSet<CollectionId>,
    link_types: IndexSet<LinkTypeId>,
    /// Latest known state per id.
    collections_map: IndexMap<CollectionId, Collection>,
    link_types_map: IndexMap<LinkTypeId, LinkType>,
    print_requests: Vec<PrintRequest>,
    navigation_requests: Vec<NavigationRequest>,
    send_email_requests: Vec<SendEmailRequest>,
    user_message_requests: Vec<UserMessageRequest>,
}

impl ChangesTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Documents ====================

    pub fn add_created_document(&mut self, document: Document) {
        self.removed_documents.shift_remove(&document.id);
        self.created_documents.insert(document.id.clone(), document);
    }

    pub fn add_updated_document(&mut self, document: Document) {
        if self.removed_documents.contains_key(&document.id) {
            return;
        }
        match self.created_documents.get_mut(&document.id) {
            Some(created) => *created = document,
            None => {
                self.updated_documents.insert(document.id.clone(), document);
            }
        }
    }

    pub fn add_removed_document(&mut self, document: Document) {
        self.created_documents.shift_remove(&document.id);
        self.updated_documents.shift_remove(&document.id);
        self.removed_documents
            .entry(document.id.clone())
            .or_insert(document);
    }

    pub fn created_documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.created_documents.values()
    }

    pub fn updated_documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.updated_documents.values()
    }

    pub fn removed_documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.removed_documents.values()
    }

    pub fn created_document(&self, id: &DocumentId) -> Option<&Document> {
        self.created_documents.get(id)
    }

    pub fn updated_document(&self, id: &DocumentId) -> Option<&Document> {
        self.updated_documents.get(id)
    }

    pub fn is_created_document(&self, id: &DocumentId) -> bool {
        self.created_documents.contains_key(id)
    }

    pub fn is_removed_document(&self, id: &DocumentId) -> bool {
        self.removed_documents.contains_key(id)
    }

    // ==================== Links ====================

    pub fn add_created_link(&mut self, link: LinkInstance) {
        self.removed_links.shift_remove(&link.id);
        self.created_links.insert(link.id.clone(), link);
    }

    pub fn add_updated_link(&mut self, link: LinkInstance) {
        if self.removed_links.contains_key(&link.id) {
            return;
        }
        match self.created_links.get_mut(&link.id) {
            Some(created) => *created = link,
            None => {
                self.updated_links.insert(link.id.clone(), link);
            }
        }
    }

    pub fn add_removed_link(&mut self, link: LinkInstance) {
        self.created_links.shift_remove(&link.id);
        self.updated_links.shift_remove(&link.id);
        self.removed_links.entry(link.id.clone()).or_insert(link);
    }

    pub fn created_links(&self) -> impl Iterator<Item = &LinkInstance> + '_ {
        self.created_links.values()
    }

    pub fn updated_links(&self) -> impl Iterator<Item = &LinkInstance> + '_ {
        self.updated_links.values()
    }

    pub fn removed_links(&self) -> impl Iterator<Item = &LinkInstance> + '_ {
        self.removed_links.values()
    }

    pub fn created_link(&self, id: &LinkId) -> Option<&LinkInstance> {
        self.created_links.get(id)
    }

    pub fn is_created_link(&self, id: &LinkId) -> bool {
        self.created_links.contains_key(id)
    }

    // ==================== Schema bookkeeping ====================

    /// Mark a collection as changed and remember its latest state.
    pub fn track_collection(&mut self, collection: Collection) {
        self.collections.insert(collection.id.clone());
        self.collections_map
            .insert(collection.id.clone(), collection);
    }

    /// Mark a link type as changed and remember its latest state.
    pub fn track_link_type(&mut self, link_type: LinkType) {
        self.link_types.insert(link_type.id.clone());
        self.link_types_map.insert(link_type.id.clone(), link_type);
    }

    /// Changed collections in their latest known state.
    pub fn collections(&self) -> impl Iterator<Item = &Collection> + '_ {
        self.collections
            .iter()
            .filter_map(|id| self.collections_map.get(id))
    }

    pub fn link_types(&self) -> impl Iterator<Item = &LinkType> + '_ {
        self.link_types
            .iter()
            .filter_map(|id| self.link_types_map.get(id))
    }

    pub fn collection(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections_map.get(id)
    }

    pub fn link_type(&self, id: &LinkTypeId) -> Option<&LinkType> {
        self.link_types_map.get(id)
    }

    // ==================== Side effects ====================

    pub fn add_side_effect(&mut self, request: SideEffectRequest) {
        match request {
            SideEffectRequest::Print(request) => self.print_requests.push(request),
            SideEffectRequest::Navigate(request) => self.navigation_requests.push(request),
            SideEffectRequest::SendEmail(request) => self.send_email_requests.push(request),
            SideEffectRequest::UserMessage(request) => self.user_message_requests.push(request),
        }
    }

    pub fn print_requests(&self) -> &[PrintRequest] {
        &self.print_requests
    }

    pub fn navigation_requests(&self) -> &[NavigationRequest] {
        &self.navigation_requests
    }

    pub fn send_email_requests(&self) -> &[SendEmailRequest] {
        &self.send_email_requests
    }

    pub fn user_message_requests(&self) -> &[UserMessageRequest] {
        &self.user_message_requests
    }

    // ==================== Whole tracker ====================

    /// Fold a later tracker (e.g. of a cascaded commit) into this one.
    pub fn merge(&mut self, other: ChangesTracker) {
        for document in other.created_documents.into_values() {
            self.add_created_document(document);
        }
        for document in other.updated_documents.into_values() {
            self.add_updated_document(document);
        }
        for document in other.removed_documents.into_values() {
            self.add_removed_document(document);
        }
        for link in other.created_links.into_values() {
            self.add_created_link(link);
        }
        for link in other.updated_links.into_values() {
            self.add_updated_link(link);
        }
        for link in other.removed_links.into_values() {
            self.add_removed_link(link);
        }
        self.collections.extend(other.collections);
        self.link_types.extend(other.link_types);
        self.collections_map.extend(other.collections_map);
        self.link_types_map.extend(other.link_types_map);
        self.print_requests.extend(other.print_requests);
        self.navigation_requests.extend(other.navigation_requests);
        self.send_email_requests.extend(other.send_email_requests);
        self.user_message_requests.extend(other.user_message_requests);
    }

    pub fn is_empty(&self) -> bool {
        self.created_documents.is_empty()
            && self.updated_documents.is_empty()
            && self.removed_documents.is_empty()
            && self.created_links.is_empty()
            && self.updated_links.is_empty()
            && self.removed_links.is_empty()
            && self.collections.is_empty()
            && self.link_types.is_empty()
            && self.print_requests.is_empty()
            && self.navigation_requests.is_empty()
            && self.send_email_requests.is_empty()
            && self.user_message_requests.is_empty()
    }
}
