use async_trait::async_trait;
use tracing::instrument;

use crate::{
    domain::{Category, CategoryId},
    ApiClient, StoreError,
};

const CATEGORIES_PATH: &str = "api/categories";

/// CRUD access to categories.
#[async_trait]
pub trait CategoryStore: Send + Sync + 'static {
    async fn get_all(&self) -> Result<Vec<Category>, StoreError>;

    async fn get_by_id(&self, id: CategoryId) -> Result<Category, StoreError>;

    /// Returns the category with its store-assigned id.
    async fn create(&self, category: &Category) -> Result<Category, StoreError>;

    /// Returns the category as submitted.
    async fn update(&self, category: &Category) -> Result<Category, StoreError>;

    async fn delete(&self, id: CategoryId) -> Result<(), StoreError>;
}

/// Category store backed by the `/api/categories` resource.
#[derive(Debug, Clone)]
pub struct HttpCategoryStore {
    api: ApiClient,
}

impl HttpCategoryStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CategoryStore for HttpCategoryStore {
    #[instrument(name = "HttpCategoryStore::get_all", skip(self))]
    async fn get_all(&self) -> Result<Vec<Category>, StoreError> {
        self.api.get_json(CATEGORIES_PATH).await
    }

    #[instrument(name = "HttpCategoryStore::get_by_id", skip_all, fields(id = %id))]
    async fn get_by_id(&self, id: CategoryId) -> Result<Category, StoreError> {
        self.api
            .get_json(&format!("{CATEGORIES_PATH}/{id}"))
            .await
    }

    #[instrument(name = "HttpCategoryStore::create", skip_all)]
    async fn create(&self, category: &Category) -> Result<Category, StoreError> {
        self.api.post_json(CATEGORIES_PATH, category).await
    }

    #[instrument(name = "HttpCategoryStore::update", skip_all, fields(id = ?category.id))]
    async fn update(&self, category: &Category) -> Result<Category, StoreError> {
        let id = category.id.ok_or(StoreError::MissingId)?;
        self.api
            .put_without_response(&format!("{CATEGORIES_PATH}/{id}"), category)
            .await?;
        Ok(category.clone())
    }

    #[instrument(name = "HttpCategoryStore::delete", skip_all, fields(id = %id))]
    async fn delete(&self, id: CategoryId) -> Result<(), StoreError> {
        self.api.delete(&format!("{CATEGORIES_PATH}/{id}")).await
    }
}
