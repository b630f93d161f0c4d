use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::{Amount, Category, CategoryId, EntryId};

/// Whether an entry takes money out or brings it in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntryType {
    #[default]
    Expense,
    Income,
}

impl EntryType {
    pub fn label(&self) -> &'static str {
        match self {
            EntryType::Expense => "Expense",
            EntryType::Income => "Income",
        }
    }

    /// Every type in declaration order, paired with its display label.
    pub fn options() -> Vec<TypeOption> {
        Self::iter()
            .map(|value| TypeOption {
                value,
                label: value.label(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeOption {
    pub value: EntryType,
    pub label: &'static str,
}

/// A single income or expense transaction.
///
/// `category` is the server-facing embed of `category_id`. It is filled in by
/// the write path and never trusted from form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub amount: Amount,
    pub date: NaiveDate,
    pub paid: bool,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Entry {
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lunch() -> Entry {
        Entry {
            id: None,
            name: "Lunch".to_string(),
            description: None,
            entry_type: EntryType::Expense,
            amount: Amount::from_cents(2590),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            paid: true,
            category_id: CategoryId::new(4),
            category: None,
        }
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(lunch()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Lunch",
                "type": "expense",
                "amount": "25.90",
                "date": "2024-03-09",
                "paid": true,
                "categoryId": 4
            })
        );
    }

    #[test]
    fn absent_optional_fields_stay_absent() {
        let entry: Entry = serde_json::from_value(json!({
            "id": 7,
            "name": "Salary",
            "type": "income",
            "amount": 5000,
            "date": "2024-03-01",
            "paid": false,
            "categoryId": 2
        }))
        .unwrap();

        assert_eq!(entry.id, Some(EntryId::new(7)));
        assert_eq!(entry.description, None);
        assert_eq!(entry.category, None);
        assert_eq!(entry.entry_type, EntryType::Income);
        assert_eq!(entry.amount, Amount::from_cents(500000));
    }

    #[test]
    fn rejects_unknown_type() {
        let result = serde_json::from_value::<Entry>(json!({
            "name": "Lunch",
            "type": "transfer",
            "amount": "1.00",
            "date": "2024-03-09",
            "paid": true,
            "categoryId": 4
        }));
        assert!(result.is_err());
    }

    #[test]
    fn type_options_follow_declaration_order() {
        let options = EntryType::options();
        assert_eq!(
            options,
            vec![
                TypeOption {
                    value: EntryType::Expense,
                    label: "Expense"
                },
                TypeOption {
                    value: EntryType::Income,
                    label: "Income"
                },
            ]
        );
    }

    #[test]
    fn parses_type_case_insensitively() {
        assert_eq!("INCOME".parse::<EntryType>().unwrap(), EntryType::Income);
        assert_eq!("expense".parse::<EntryType>().unwrap(), EntryType::Expense);
        assert!("refund".parse::<EntryType>().is_err());
    }
}
