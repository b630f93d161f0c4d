use async_trait::async_trait;
use tracing::{instrument, warn};

use super::{CategoryStore, HttpCategoryStore};
use crate::{
    domain::{Category, CategoryId, Entry, EntryId},
    ApiClient, StoreError,
};

const ENTRIES_PATH: &str = "api/entries";

/// Raw persistence of entry records, with no cross-entity logic.
#[async_trait]
pub trait EntryRecords: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Entry>, StoreError>;

    async fn fetch(&self, id: EntryId) -> Result<Entry, StoreError>;

    /// Returns the stored record, including its newly assigned id.
    async fn insert(&self, entry: &Entry) -> Result<Entry, StoreError>;

    async fn replace(&self, id: EntryId, entry: &Entry) -> Result<(), StoreError>;

    async fn remove(&self, id: EntryId) -> Result<(), StoreError>;
}

/// Entry records backed by the `/api/entries` resource.
#[derive(Debug, Clone)]
pub struct HttpEntryRecords {
    api: ApiClient,
}

impl HttpEntryRecords {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl EntryRecords for HttpEntryRecords {
    async fn list(&self) -> Result<Vec<Entry>, StoreError> {
        self.api.get_json(ENTRIES_PATH).await
    }

    async fn fetch(&self, id: EntryId) -> Result<Entry, StoreError> {
        self.api.get_json(&format!("{ENTRIES_PATH}/{id}")).await
    }

    async fn insert(&self, entry: &Entry) -> Result<Entry, StoreError> {
        self.api.post_json(ENTRIES_PATH, entry).await
    }

    async fn replace(&self, id: EntryId, entry: &Entry) -> Result<(), StoreError> {
        self.api
            .put_without_response(&format!("{ENTRIES_PATH}/{id}"), entry)
            .await
    }

    async fn remove(&self, id: EntryId) -> Result<(), StoreError> {
        self.api.delete(&format!("{ENTRIES_PATH}/{id}")).await
    }
}

/// CRUD access to entries.
///
/// Every write first resolves the entry's category through `C` and embeds the
/// result; the record write is only issued once that lookup has succeeded.
#[derive(Debug, Clone)]
pub struct EntryStore<C, R> {
    categories: C,
    records: R,
}

pub type HttpEntryStore = EntryStore<HttpCategoryStore, HttpEntryRecords>;

impl HttpEntryStore {
    pub fn http(api: ApiClient) -> Self {
        Self::new(HttpCategoryStore::new(api.clone()), HttpEntryRecords::new(api))
    }
}

impl<C: CategoryStore, R: EntryRecords> EntryStore<C, R> {
    pub fn new(categories: C, records: R) -> Self {
        Self {
            categories,
            records,
        }
    }

    /// The category store used for resolution, for read-only callers.
    pub fn categories(&self) -> &C {
        &self.categories
    }

    #[instrument(name = "EntryStore::get_all", skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Entry>, StoreError> {
        self.records.list().await
    }

    #[instrument(name = "EntryStore::get_by_id", skip_all, fields(id = %id))]
    pub async fn get_by_id(&self, id: EntryId) -> Result<Entry, StoreError> {
        self.records.fetch(id).await
    }

    /// Creates `entry`, returning the store's hydrated copy.
    #[instrument(name = "EntryStore::create", skip_all, fields(category_id = %entry.category_id))]
    pub async fn create(&self, mut entry: Entry) -> Result<Entry, StoreError> {
        entry.category = Some(self.resolve_category(entry.category_id).await?);
        self.records.insert(&entry).await
    }

    /// Updates `entry` in place. The returned entry is the submitted one,
    /// carrying the resolved category.
    #[instrument(name = "EntryStore::update", skip_all, fields(id = ?entry.id, category_id = %entry.category_id))]
    pub async fn update(&self, mut entry: Entry) -> Result<Entry, StoreError> {
        let id = entry.id.ok_or(StoreError::MissingId)?;
        entry.category = Some(self.resolve_category(entry.category_id).await?);
        self.records.replace(id, &entry).await?;
        Ok(entry)
    }

    #[instrument(name = "EntryStore::delete", skip_all, fields(id = %id))]
    pub async fn delete(&self, id: EntryId) -> Result<(), StoreError> {
        self.records.remove(id).await
    }

    async fn resolve_category(&self, category_id: CategoryId) -> Result<Category, StoreError> {
        self.categories.get_by_id(category_id).await.map_err(|source| {
            warn!(%category_id, error = %source, "category resolution failed, write skipped");
            StoreError::CategoryResolution {
                category_id,
                source: Box::new(source),
            }
        })
    }
}
