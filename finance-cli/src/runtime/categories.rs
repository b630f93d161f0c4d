use anyhow::{bail, Result};
use finance_client::{domain::Category, stores::CategoryStore};
use std::io::Write;

use crate::app::{CategoryField, CategoryFormController, SubmitError, FAILURE_NOTICE, SUCCESS_NOTICE};
use crate::cli::{CategoryArgs, CategoryCommand};

pub(super) async fn run<C: CategoryStore>(
    command: CategoryCommand,
    store: &C,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        CategoryCommand::List => list(store, out).await,
        CategoryCommand::New(args) => save(store, "new", args, out).await,
        CategoryCommand::Edit { id, fields } => save(store, &format!("{id}/edit"), fields, out).await,
    }
}

async fn list<C: CategoryStore>(store: &C, out: &mut impl Write) -> Result<()> {
    match store.get_all().await {
        Ok(categories) => {
            for category in &categories {
                writeln!(out, "{}", category_line(category))?;
            }
            Ok(())
        }
        Err(error) => {
            writeln!(out, "{}", crate::app::LOAD_FAILURE_NOTICE)?;
            Err(error.into())
        }
    }
}

async fn save<C: CategoryStore>(
    store: &C,
    route: &str,
    args: CategoryArgs,
    out: &mut impl Write,
) -> Result<()> {
    let mut form = CategoryFormController::new(store, route)?;
    if let Err(failure) = form.load().await {
        writeln!(out, "{}", failure.notice())?;
        return Err(failure.into());
    }

    writeln!(out, "{}", form.page_title())?;
    if let Some(name) = args.name {
        form.set_field(CategoryField::Name, name);
    }
    if let Some(description) = args.description {
        form.set_field(CategoryField::Description, description);
    }

    match form.submit().await {
        Ok(category) => {
            writeln!(out, "{SUCCESS_NOTICE}")?;
            writeln!(out, "{}", category_line(&category))?;
            if let Some(route) = form.edit_route() {
                writeln!(out, "edit with: finance-cli categories edit {}", route.trim_end_matches("/edit"))?;
            }
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => {
            for &field in errors.keys() {
                let value = form.field_value(field).trim();
                for error in form.field_errors(field) {
                    if value.is_empty() {
                        writeln!(out, "{field}: {error}")?;
                    } else {
                        writeln!(out, "{field}: {error} (got {value:?})")?;
                    }
                }
            }
            bail!("category form is invalid")
        }
        Err(SubmitError::Failed { source, .. }) => {
            writeln!(out, "{FAILURE_NOTICE}")?;
            for message in form.server_error_messages() {
                writeln!(out, "  {message}")?;
            }
            Err(source.into())
        }
        Err(error) => Err(error.into()),
    }
}

fn category_line(category: &Category) -> String {
    let id = category.id.map(|id| id.to_string()).unwrap_or_default();
    match &category.description {
        Some(description) => format!("{id:>5}  {}  ({description})", category.name),
        None => format!("{id:>5}  {}", category.name),
    }
}
