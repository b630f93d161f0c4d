//! In-process backend used for dev mode and tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    domain::{Category, CategoryId, Entry, EntryId},
    stores::{CategoryStore, EntryRecords},
    StoreError,
};

/// The kinds of call the backend answers, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListCategories,
    FetchCategory,
    InsertCategory,
    ReplaceCategory,
    RemoveCategory,
    ListEntries,
    FetchEntry,
    InsertEntry,
    ReplaceEntry,
    RemoveEntry,
}

/// A call as received, including its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCategories,
    FetchCategory(CategoryId),
    InsertCategory(Category),
    ReplaceCategory(CategoryId, Category),
    RemoveCategory(CategoryId),
    ListEntries,
    FetchEntry(EntryId),
    InsertEntry(Entry),
    ReplaceEntry(EntryId, Entry),
    RemoveEntry(EntryId),
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::ListCategories => Operation::ListCategories,
            Call::FetchCategory(_) => Operation::FetchCategory,
            Call::InsertCategory(_) => Operation::InsertCategory,
            Call::ReplaceCategory(..) => Operation::ReplaceCategory,
            Call::RemoveCategory(_) => Operation::RemoveCategory,
            Call::ListEntries => Operation::ListEntries,
            Call::FetchEntry(_) => Operation::FetchEntry,
            Call::InsertEntry(_) => Operation::InsertEntry,
            Call::ReplaceEntry(..) => Operation::ReplaceEntry,
            Call::RemoveEntry(_) => Operation::RemoveEntry,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    categories: BTreeMap<CategoryId, Category>,
    entries: BTreeMap<EntryId, Entry>,
    next_category_id: i64,
    next_entry_id: i64,
    failures: HashMap<Operation, StoreError>,
    calls: Vec<Call>,
}

impl MemoryState {
    fn assign_category_id(&mut self) -> CategoryId {
        self.next_category_id = self.next_category_id.max(1);
        let id = CategoryId::new(self.next_category_id);
        self.next_category_id += 1;
        id
    }

    fn assign_entry_id(&mut self) -> EntryId {
        self.next_entry_id = self.next_entry_id.max(1);
        let id = EntryId::new(self.next_entry_id);
        self.next_entry_id += 1;
        id
    }
}

/// Category store and entry records kept in memory.
///
/// Clones share the same state. Every call is logged before it is answered,
/// and an operation configured with [`MemoryBackend::with_failure`] fails
/// without touching the data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds categories, assigning ids to those without one.
    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        {
            let mut state = self.lock();
            for mut category in categories {
                let id = match category.id {
                    Some(id) => {
                        state.next_category_id = state.next_category_id.max(id.as_i64() + 1);
                        id
                    }
                    None => state.assign_category_id(),
                };
                category.id = Some(id);
                state.categories.insert(id, category);
            }
        }
        self
    }

    /// Seeds entries, assigning ids to those without one.
    pub fn with_entries(self, entries: Vec<Entry>) -> Self {
        {
            let mut state = self.lock();
            for mut entry in entries {
                let id = match entry.id {
                    Some(id) => {
                        state.next_entry_id = state.next_entry_id.max(id.as_i64() + 1);
                        id
                    }
                    None => state.assign_entry_id(),
                };
                entry.id = Some(id);
                state.entries.insert(id, entry);
            }
        }
        self
    }

    pub fn with_failure(self, operation: Operation, error: StoreError) -> Self {
        self.fail(operation, error);
        self
    }

    /// Makes every later `operation` call fail with `error`.
    pub fn fail(&self, operation: Operation, error: StoreError) {
        self.lock().failures.insert(operation, error);
    }

    pub fn recover(&self, operation: Operation) {
        self.lock().failures.remove(&operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.lock().entries.values().cloned().collect()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Logs `call` and returns the state, unless the call is set up to fail.
    fn answer(&self, call: Call) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let mut state = self.lock();
        let operation = call.operation();
        state.calls.push(call);
        if let Some(error) = state.failures.get(&operation).cloned() {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl CategoryStore for MemoryBackend {
    async fn get_all(&self) -> Result<Vec<Category>, StoreError> {
        let state = self.answer(Call::ListCategories)?;
        Ok(state.categories.values().cloned().collect())
    }

    async fn get_by_id(&self, id: CategoryId) -> Result<Category, StoreError> {
        let state = self.answer(Call::FetchCategory(id))?;
        state
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("category {id}")))
    }

    async fn create(&self, category: &Category) -> Result<Category, StoreError> {
        let mut state = self.answer(Call::InsertCategory(category.clone()))?;
        let id = state.assign_category_id();
        let stored = Category {
            id: Some(id),
            ..category.clone()
        };
        state.categories.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, category: &Category) -> Result<Category, StoreError> {
        let id = category.id.ok_or(StoreError::MissingId)?;
        let mut state = self.answer(Call::ReplaceCategory(id, category.clone()))?;
        match state.categories.get_mut(&id) {
            Some(stored) => {
                *stored = category.clone();
                Ok(category.clone())
            }
            None => Err(StoreError::NotFound(format!("category {id}"))),
        }
    }

    async fn delete(&self, id: CategoryId) -> Result<(), StoreError> {
        let mut state = self.answer(Call::RemoveCategory(id))?;
        state
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("category {id}")))
    }
}

#[async_trait]
impl EntryRecords for MemoryBackend {
    async fn list(&self) -> Result<Vec<Entry>, StoreError> {
        let state = self.answer(Call::ListEntries)?;
        Ok(state.entries.values().cloned().collect())
    }

    async fn fetch(&self, id: EntryId) -> Result<Entry, StoreError> {
        let state = self.answer(Call::FetchEntry(id))?;
        state
            .entries
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("entry {id}")))
    }

    async fn insert(&self, entry: &Entry) -> Result<Entry, StoreError> {
        let mut state = self.answer(Call::InsertEntry(entry.clone()))?;
        let id = state.assign_entry_id();
        let stored = Entry {
            id: Some(id),
            ..entry.clone()
        };
        state.entries.insert(id, stored.clone());
        Ok(stored)
    }

    async fn replace(&self, id: EntryId, entry: &Entry) -> Result<(), StoreError> {
        let mut state = self.answer(Call::ReplaceEntry(id, entry.clone()))?;
        match state.entries.get_mut(&id) {
            Some(stored) => {
                *stored = Entry {
                    id: Some(id),
                    ..entry.clone()
                };
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("entry {id}"))),
        }
    }

    async fn remove(&self, id: EntryId) -> Result<(), StoreError> {
        let mut state = self.answer(Call::RemoveEntry(id))?;
        state
            .entries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("entry {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_ids_are_never_reassigned() {
        let backend = MemoryBackend::new().with_categories(vec![
            Category {
                id: Some(CategoryId::new(10)),
                name: "Rent".to_string(),
                description: None,
            },
            Category::new("Leisure", None),
        ]);

        let ids: Vec<_> = backend.categories().iter().filter_map(|c| c.id).collect();
        assert_eq!(ids, vec![CategoryId::new(10), CategoryId::new(11)]);

        let created = CategoryStore::create(&backend, &Category::new("Health", None))
            .await
            .unwrap();
        assert_eq!(created.id, Some(CategoryId::new(12)));
    }

    #[tokio::test]
    async fn injected_failure_leaves_data_untouched() {
        let backend = MemoryBackend::new().with_failure(
            Operation::InsertCategory,
            StoreError::Transport("down".to_string()),
        );

        let result = CategoryStore::create(&backend, &Category::new("Health", None)).await;

        assert_eq!(result, Err(StoreError::Transport("down".to_string())));
        assert!(backend.categories().is_empty());
        assert_eq!(
            backend.calls(),
            vec![Call::InsertCategory(Category::new("Health", None))]
        );

        backend.recover(Operation::InsertCategory);
        assert!(CategoryStore::create(&backend, &Category::new("Health", None))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let backend = MemoryBackend::new();

        assert!(matches!(
            backend.fetch(EntryId::new(1)).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            CategoryStore::delete(&backend, CategoryId::new(1)).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
