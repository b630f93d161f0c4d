//! Seed data for `--dev` mode.
//! Names are two-letter codes so seeded records pass form validation when edited.

use chrono::NaiveDate;
use finance_client::{
    domain::{Amount, Category, CategoryId, Entry, EntryId, EntryType},
    MemoryBackend,
};

fn category(id: i64, name: &str, description: &str) -> Category {
    Category {
        id: Some(CategoryId::new(id)),
        name: name.to_string(),
        description: Some(description.to_string()),
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        category(1, "Fd", "Food and groceries"),
        category(2, "Hm", "Rent and utilities"),
        category(3, "Tr", "Transport"),
        category(4, "Sl", "Salary"),
    ]
}

fn entry(
    id: i64,
    name: &str,
    entry_type: EntryType,
    cents: i64,
    (year, month, day): (i32, u32, u32),
    paid: bool,
    category_id: i64,
) -> Option<Entry> {
    let category = categories()
        .into_iter()
        .find(|category| category.id == Some(CategoryId::new(category_id)));
    Some(Entry {
        id: Some(EntryId::new(id)),
        name: name.to_string(),
        description: None,
        entry_type,
        amount: Amount::from_cents(cents),
        date: NaiveDate::from_ymd_opt(year, month, day)?,
        paid,
        category_id: CategoryId::new(category_id),
        category,
    })
}

pub fn entries() -> Vec<Entry> {
    [
        entry(1, "Mk", EntryType::Expense, 34_250, (2024, 3, 2), true, 1),
        entry(2, "Rt", EntryType::Expense, 180_000, (2024, 3, 5), true, 2),
        entry(3, "Bs", EntryType::Expense, 4_400, (2024, 3, 7), false, 3),
        entry(4, "Py", EntryType::Income, 650_000, (2024, 3, 10), true, 4),
        entry(5, "El", EntryType::Expense, 21_399, (2024, 3, 15), false, 2),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn seeded_backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_categories(categories())
        .with_entries(entries())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_seeded_entry_embeds_its_category() {
        let entries = entries();
        assert_eq!(entries.len(), 5);
        for entry in entries {
            let category = entry.category.expect("seeded entries embed their category");
            assert_eq!(category.id, Some(entry.category_id));
        }
    }
}
