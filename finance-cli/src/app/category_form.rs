use finance_client::{
    domain::{Category, CategoryId},
    stores::CategoryStore,
};
use strum::Display;
use tracing::{debug, info, warn};

use super::{
    resolve_mode, server_error_messages, FieldError, FieldSet, FormMode, FormState, LoadFailure,
    RouteError, Rule, SubmitError, CATEGORIES_RESOURCE,
};

pub const NEW_CATEGORY_TITLE: &str = "New category";
const NAME_MAX_LENGTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "camelCase")]
pub enum CategoryField {
    Id,
    Name,
    Description,
}

/// Drives the create/edit page of one category. Writes go straight to the store.
pub struct CategoryFormController<'a, C> {
    store: &'a C,
    mode: FormMode<CategoryId>,
    state: FormState<Category>,
    form: FieldSet<CategoryField>,
    category: Option<Category>,
}

impl<'a, C: CategoryStore> CategoryFormController<'a, C> {
    pub fn new(store: &'a C, route: &str) -> Result<Self, RouteError> {
        let mode = resolve_mode(route, CATEGORIES_RESOURCE)?;
        debug!(?mode, route, "category form activated");

        let form = FieldSet::new()
            .with_field(CategoryField::Id, "", vec![])
            .with_field(
                CategoryField::Name,
                "",
                vec![Rule::Required, Rule::MaxLength(NAME_MAX_LENGTH)],
            )
            .with_field(CategoryField::Description, "", vec![]);

        Ok(Self {
            store,
            mode,
            state: FormState::Loading,
            form,
            category: None,
        })
    }

    /// Loads the category being edited. Create mode has nothing to fetch.
    pub async fn load(&mut self) -> Result<(), LoadFailure> {
        if let FormMode::Edit(id) = self.mode {
            match self.store.get_by_id(id).await {
                Ok(category) => self.hydrate(category),
                Err(source) => {
                    warn!(%id, error = %source, "could not load category");
                    let failure = LoadFailure::Record {
                        kind: "category",
                        id: id.as_i64(),
                        source,
                    };
                    self.state = FormState::LoadFailed(failure.clone());
                    return Err(failure);
                }
            }
        }

        self.state = FormState::Idle;
        Ok(())
    }

    pub fn set_field(&mut self, field: CategoryField, value: impl Into<String>) -> &[FieldError] {
        self.form.set(field, value)
    }

    pub fn field_value(&self, field: CategoryField) -> &str {
        self.form.value(field)
    }

    pub fn field_errors(&self, field: CategoryField) -> &[FieldError] {
        self.form.field_errors(field)
    }

    #[allow(dead_code)]
    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    #[allow(dead_code)]
    pub fn mode(&self) -> FormMode<CategoryId> {
        self.mode
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &FormState<Category> {
        &self.state
    }

    #[allow(dead_code)]
    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn server_error_messages(&self) -> &[String] {
        match &self.state {
            FormState::Failed(messages) => messages,
            _ => &[],
        }
    }

    pub fn page_title(&self) -> String {
        match self.mode {
            FormMode::Create => NEW_CATEGORY_TITLE.to_string(),
            FormMode::Edit(_) => {
                let name = self
                    .category
                    .as_ref()
                    .map_or("", |category| category.name.as_str());
                format!("Editing category: {name}")
            }
        }
    }

    pub fn edit_route(&self) -> Option<String> {
        self.mode.id().map(|id| format!("{id}/edit"))
    }

    pub async fn submit(&mut self) -> Result<Category, SubmitError<CategoryField>> {
        if !self.state.accepts_submit() {
            return Err(SubmitError::Busy(self.state.name()));
        }

        self.form.validate_all();
        if !self.form.is_valid() {
            return Err(SubmitError::Invalid(self.form.errors()));
        }
        let category = Category {
            id: self.mode.id(),
            name: self.form.value(CategoryField::Name).trim().to_string(),
            description: self.form.optional_value(CategoryField::Description),
        };

        self.state = FormState::Submitting;
        let result = match self.mode {
            FormMode::Create => self.store.create(&category).await,
            FormMode::Edit(_) => self.store.update(&category).await,
        };

        match result {
            Ok(saved) => {
                info!(id = ?saved.id, "category saved");
                self.hydrate(saved.clone());
                self.state = FormState::Succeeded(saved.clone());
                Ok(saved)
            }
            Err(source) => {
                let messages = server_error_messages(&source);
                warn!(error = %source, "category submission failed");
                self.state = FormState::Failed(messages.clone());
                Err(SubmitError::Failed { messages, source })
            }
        }
    }

    fn hydrate(&mut self, category: Category) {
        if let Some(id) = category.id {
            self.mode = FormMode::Edit(id);
        }
        self.form.set(
            CategoryField::Id,
            category.id.map(|id| id.to_string()).unwrap_or_default(),
        );
        self.form.set(CategoryField::Name, category.name.as_str());
        self.form.set(
            CategoryField::Description,
            category.description.clone().unwrap_or_default(),
        );
        self.category = Some(category);
    }
}
