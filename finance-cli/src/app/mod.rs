use finance_client::domain::AmountFormat;

mod category_form;
mod entry_form;
mod entry_list;
mod fields;
mod state;

use fields::{FieldSet, Rule};

pub use category_form::{CategoryField, CategoryFormController};
pub use entry_form::{EntryField, EntryFormController};
pub use entry_list::EntryList;
pub use fields::FieldError;
pub use state::*;

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// How form controls render and parse amounts and dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSettings {
    pub amount_format: AmountFormat,
    pub date_format: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            amount_format: AmountFormat::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}
