//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups return `Ok(None)` when
//! no document matches so callers decide how absence is reported.

use uuid::Uuid;

use crate::error::DelishResult;
use crate::models::store::{CreateStore, Store, TagCount, UpdateStore};

pub trait StoreRepository: Send + Sync {
    /// Validate and insert a new store, deriving a unique slug from its name.
    fn create(&self, input: CreateStore) -> impl Future<Output = DelishResult<Store>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DelishResult<Option<Store>>> + Send;
    fn get_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = DelishResult<Option<Store>>> + Send;
    /// Every store, oldest first.
    fn list(&self) -> impl Future<Output = DelishResult<Vec<Store>>> + Send;
    /// Stores carrying `tag`, or every store with at least one tag when
    /// `tag` is `None`.
    fn list_by_tag(
        &self,
        tag: Option<&str>,
    ) -> impl Future<Output = DelishResult<Vec<Store>>> + Send;
    /// Validate and apply `input`, returning the updated document.
    fn update(
        &self,
        id: Uuid,
        input: UpdateStore,
    ) -> impl Future<Output = DelishResult<Option<Store>>> + Send;
    /// Distinct tags with the number of stores carrying each, most used first.
    fn tag_counts(&self) -> impl Future<Output = DelishResult<Vec<TagCount>>> + Send;
}
