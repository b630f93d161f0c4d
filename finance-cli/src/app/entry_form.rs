use chrono::NaiveDate;
use finance_client::{
    domain::{Amount, Category, CategoryId, Entry, EntryId, EntryType, TypeOption},
    stores::{CategoryStore, EntryRecords, EntryStore},
};
use strum::Display;
use tracing::{debug, info, warn};

use super::{
    resolve_mode, server_error_messages, FieldError, FieldSet, FormMode, FormSettings, FormState,
    LoadFailure, RouteError, Rule, SubmitError, ENTRIES_RESOURCE,
};

pub const NEW_ENTRY_TITLE: &str = "New entry";
const NAME_MAX_LENGTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "camelCase")]
pub enum EntryField {
    Id,
    Name,
    Description,
    Type,
    Amount,
    Date,
    Paid,
    CategoryId,
}

/// Drives the create/edit page of one entry.
pub struct EntryFormController<'a, C, R> {
    store: &'a EntryStore<C, R>,
    settings: FormSettings,
    mode: FormMode<EntryId>,
    state: FormState<Entry>,
    form: FieldSet<EntryField>,
    entry: Option<Entry>,
    categories: Vec<Category>,
    category_failure: Option<LoadFailure>,
}

impl<'a, C: CategoryStore, R: EntryRecords> EntryFormController<'a, C, R> {
    /// Activates the form for `route` (`new` or `{id}/edit`).
    pub fn new(
        store: &'a EntryStore<C, R>,
        settings: FormSettings,
        route: &str,
    ) -> Result<Self, RouteError> {
        let mode = resolve_mode(route, ENTRIES_RESOURCE)?;
        debug!(?mode, route, "entry form activated");
        let form = build_entry_form(&settings);

        Ok(Self {
            store,
            settings,
            mode,
            state: FormState::Loading,
            form,
            entry: None,
            categories: Vec::new(),
            category_failure: None,
        })
    }

    /// Loads the category list and, when editing, the entry itself.
    ///
    /// A failed entry load is terminal for this activation. A failed category
    /// load is reported but leaves the form usable.
    pub async fn load(&mut self) -> Result<(), LoadFailure> {
        let store = self.store;
        let (entry, categories) = match self.mode {
            FormMode::Create => (None, store.categories().get_all().await),
            FormMode::Edit(id) => {
                let (entry, categories) =
                    tokio::join!(store.get_by_id(id), store.categories().get_all());
                (Some((id, entry)), categories)
            }
        };

        match categories {
            Ok(categories) => {
                self.categories = categories;
                self.category_failure = None;
            }
            Err(source) => {
                warn!(error = %source, "could not load categories");
                self.category_failure = Some(LoadFailure::Categories(source));
            }
        }

        if let Some((id, result)) = entry {
            match result {
                Ok(entry) => self.hydrate(entry),
                Err(source) => {
                    warn!(%id, error = %source, "could not load entry");
                    let failure = LoadFailure::Record {
                        kind: "entry",
                        id: id.as_i64(),
                        source,
                    };
                    self.state = FormState::LoadFailed(failure.clone());
                    return Err(failure);
                }
            }
        }

        self.state = FormState::Idle;
        match &self.category_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    /// Changes one control; returns its errors after revalidation.
    pub fn set_field(&mut self, field: EntryField, value: impl Into<String>) -> &[FieldError] {
        self.form.set(field, value)
    }

    pub fn field_value(&self, field: EntryField) -> &str {
        self.form.value(field)
    }

    pub fn field_errors(&self, field: EntryField) -> &[FieldError] {
        self.form.field_errors(field)
    }

    #[allow(dead_code)]
    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    #[allow(dead_code)]
    pub fn can_submit(&self) -> bool {
        self.state.accepts_submit() && self.form.is_valid()
    }

    #[allow(dead_code)]
    pub fn mode(&self) -> FormMode<EntryId> {
        self.mode
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &FormState<Entry> {
        &self.state
    }

    #[allow(dead_code)]
    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[allow(dead_code)]
    pub fn category_failure(&self) -> Option<&LoadFailure> {
        self.category_failure.as_ref()
    }

    /// Messages from the last failed submission.
    pub fn server_error_messages(&self) -> &[String] {
        match &self.state {
            FormState::Failed(messages) => messages,
            _ => &[],
        }
    }

    pub fn page_title(&self) -> String {
        match self.mode {
            FormMode::Create => NEW_ENTRY_TITLE.to_string(),
            FormMode::Edit(_) => {
                let name = self.entry.as_ref().map_or("", |entry| entry.name.as_str());
                format!("Editing entry: {name}")
            }
        }
    }

    pub fn type_options(&self) -> Vec<TypeOption> {
        EntryType::options()
    }

    /// Route of the edit page for the current record, once it has an id.
    pub fn edit_route(&self) -> Option<String> {
        self.mode.id().map(|id| format!("{id}/edit"))
    }

    /// Sends the field-set to the store.
    ///
    /// On success the form switches to editing the saved record. On failure
    /// the messages for the user are kept in [`FormState::Failed`].
    pub async fn submit(&mut self) -> Result<Entry, SubmitError<EntryField>> {
        if !self.state.accepts_submit() {
            return Err(SubmitError::Busy(self.state.name()));
        }

        self.form.validate_all();
        let entry = match self.entry_from_form() {
            Some(entry) if self.form.is_valid() => entry,
            _ => return Err(SubmitError::Invalid(self.form.errors())),
        };

        self.state = FormState::Submitting;
        let result = match self.mode {
            FormMode::Create => self.store.create(entry).await,
            FormMode::Edit(_) => self.store.update(entry).await,
        };

        match result {
            Ok(saved) => {
                info!(id = ?saved.id, "entry saved");
                self.hydrate(saved.clone());
                self.state = FormState::Succeeded(saved.clone());
                Ok(saved)
            }
            Err(source) => {
                let messages = server_error_messages(&source);
                warn!(error = %source, "entry submission failed");
                self.state = FormState::Failed(messages.clone());
                Err(SubmitError::Failed { messages, source })
            }
        }
    }

    fn hydrate(&mut self, entry: Entry) {
        if let Some(id) = entry.id {
            self.mode = FormMode::Edit(id);
        }

        let format = self.settings.amount_format;
        let date = entry.date.format(&self.settings.date_format).to_string();
        self.form.set(
            EntryField::Id,
            entry.id.map(|id| id.to_string()).unwrap_or_default(),
        );
        self.form.set(EntryField::Name, entry.name.as_str());
        self.form.set(
            EntryField::Description,
            entry.description.clone().unwrap_or_default(),
        );
        self.form.set(EntryField::Type, entry.entry_type.to_string());
        self.form.set(EntryField::Amount, entry.amount.format(format));
        self.form.set(EntryField::Date, date);
        self.form.set(EntryField::Paid, entry.paid.to_string());
        self.form
            .set(EntryField::CategoryId, entry.category_id.to_string());
        self.entry = Some(entry);
    }

    /// Builds an entry from the controls, or `None` if any typed value fails to parse.
    fn entry_from_form(&self) -> Option<Entry> {
        let form = &self.form;
        let id = match form.optional_value(EntryField::Id) {
            Some(raw) => Some(raw.parse::<EntryId>().ok()?),
            None => None,
        }
        .or(self.mode.id());

        Some(Entry {
            id,
            name: form.value(EntryField::Name).trim().to_string(),
            description: form.optional_value(EntryField::Description),
            entry_type: form.value(EntryField::Type).trim().parse().ok()?,
            amount: Amount::parse(form.value(EntryField::Amount), self.settings.amount_format)
                .ok()?,
            date: parse_date(form.value(EntryField::Date), &self.settings.date_format).ok()?,
            paid: parse_flag(form.value(EntryField::Paid)).ok()?,
            category_id: form.value(EntryField::CategoryId).parse::<CategoryId>().ok()?,
            category: None,
        })
    }
}

fn build_entry_form(settings: &FormSettings) -> FieldSet<EntryField> {
    let amount_format = settings.amount_format;
    let date_format = settings.date_format.clone();

    FieldSet::new()
        .with_field(
            EntryField::Id,
            "",
            vec![Rule::parses(|value| {
                value
                    .parse::<EntryId>()
                    .map(|_| ())
                    .map_err(|_| "must be an entry id".to_string())
            })],
        )
        .with_field(
            EntryField::Name,
            "",
            vec![Rule::Required, Rule::MaxLength(NAME_MAX_LENGTH)],
        )
        .with_field(EntryField::Description, "", vec![])
        .with_field(
            EntryField::Type,
            EntryType::default().to_string(),
            vec![
                Rule::Required,
                Rule::parses(|value| {
                    value
                        .parse::<EntryType>()
                        .map(|_| ())
                        .map_err(|_| format!("must be one of: {}", type_values().join(", ")))
                }),
            ],
        )
        .with_field(
            EntryField::Amount,
            "",
            vec![
                Rule::Required,
                Rule::parses(move |value| {
                    Amount::parse(value, amount_format)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                }),
            ],
        )
        .with_field(
            EntryField::Date,
            "",
            vec![
                Rule::Required,
                Rule::parses(move |value| {
                    parse_date(value, &date_format)
                        .map(|_| ())
                        .map_err(|_| format!("must be a date like {date_format}"))
                }),
            ],
        )
        .with_field(
            EntryField::Paid,
            "true",
            vec![
                Rule::Required,
                Rule::parses(|value| parse_flag(value).map(|_| ())),
            ],
        )
        .with_field(
            EntryField::CategoryId,
            "",
            vec![
                Rule::Required,
                Rule::parses(|value| {
                    value
                        .parse::<CategoryId>()
                        .map(|_| ())
                        .map_err(|_| "must be a category id".to_string())
                }),
            ],
        )
}

fn type_values() -> Vec<String> {
    EntryType::options()
        .into_iter()
        .map(|option| option.value.to_string())
        .collect()
}

/// Parses a date in the configured format, falling back to ISO `YYYY-MM-DD`.
pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate, chrono::ParseError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, format).or_else(|_| value.parse::<NaiveDate>())
}

pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(format!("{other:?} is not yes or no")),
    }
}
