use std::cmp::Reverse;

use finance_client::{
    domain::{Entry, EntryId},
    stores::{CategoryStore, EntryRecords, EntryStore},
    StoreError,
};
use tracing::{info, warn};

use super::LoadFailure;

/// All entries, newest id first.
pub struct EntryList<'a, C, R> {
    store: &'a EntryStore<C, R>,
    entries: Vec<Entry>,
}

impl<'a, C: CategoryStore, R: EntryRecords> EntryList<'a, C, R> {
    pub fn new(store: &'a EntryStore<C, R>) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<(), LoadFailure> {
        let mut entries = self.store.get_all().await.map_err(|source| {
            warn!(error = %source, "could not load entries");
            LoadFailure::Entries(source)
        })?;
        // Entries without an id sort last.
        entries.sort_by_key(|entry| Reverse(entry.id.map(|id| id.as_i64()).unwrap_or(i64::MIN)));
        self.entries = entries;
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Deletes the entry and drops it from the list once the store confirms.
    pub async fn delete(&mut self, id: EntryId) -> Result<(), StoreError> {
        if let Err(error) = self.store.delete(id).await {
            warn!(%id, %error, "could not delete entry");
            return Err(error);
        }
        self.entries.retain(|entry| entry.id != Some(id));
        info!(%id, "entry deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finance_client::{
        domain::{Amount, CategoryId, EntryType},
        memory::{MemoryBackend, Operation},
    };

    fn entry(id: i64) -> Entry {
        Entry {
            id: Some(EntryId::new(id)),
            name: format!("E{id}"),
            description: None,
            entry_type: EntryType::Income,
            amount: Amount::from_cents(id * 100),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            paid: true,
            category_id: CategoryId::new(1),
            category: None,
        }
    }

    fn ids(list: &EntryList<'_, MemoryBackend, MemoryBackend>) -> Vec<i64> {
        list.entries()
            .iter()
            .filter_map(|entry| entry.id.map(|id| id.as_i64()))
            .collect()
    }

    #[tokio::test]
    async fn load_sorts_by_id_descending() {
        let backend = MemoryBackend::new().with_entries(vec![entry(2), entry(9), entry(4)]);
        let store = EntryStore::new(backend.clone(), backend.clone());
        let mut list = EntryList::new(&store);

        list.load().await.unwrap();

        assert_eq!(ids(&list), vec![9, 4, 2]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_entry() {
        let backend = MemoryBackend::new().with_entries(vec![entry(1), entry(2)]);
        let store = EntryStore::new(backend.clone(), backend.clone());
        let mut list = EntryList::new(&store);
        list.load().await.unwrap();

        backend.fail(
            Operation::RemoveEntry,
            StoreError::Transport("500 Internal Server Error".to_string()),
        );
        assert!(list.delete(EntryId::new(2)).await.is_err());
        assert_eq!(ids(&list), vec![2, 1]);

        backend.recover(Operation::RemoveEntry);
        list.delete(EntryId::new(2)).await.unwrap();
        assert_eq!(ids(&list), vec![1]);
        assert_eq!(backend.entries().len(), 1);
    }

    #[tokio::test]
    async fn failed_load_is_reported() {
        let backend = MemoryBackend::new().with_failure(
            Operation::ListEntries,
            StoreError::Transport("timeout".to_string()),
        );
        let store = EntryStore::new(backend.clone(), backend.clone());
        let mut list = EntryList::new(&store);

        assert!(matches!(list.load().await, Err(LoadFailure::Entries(_))));
        assert!(list.entries().is_empty());
    }
}
