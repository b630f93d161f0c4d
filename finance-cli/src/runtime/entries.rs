use anyhow::{bail, Result};
use finance_client::{
    domain::{Entry, EntryId},
    stores::{CategoryStore, EntryRecords, EntryStore},
};
use std::io::Write;

use crate::app::{
    EntryField, EntryFormController, EntryList, FormSettings, LoadFailure, SubmitError,
    FAILURE_NOTICE, SUCCESS_NOTICE,
};
use crate::cli::{EntryArgs, EntryCommand};

pub(super) async fn run<C: CategoryStore, R: EntryRecords>(
    command: EntryCommand,
    store: &EntryStore<C, R>,
    settings: &FormSettings,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        EntryCommand::List => list(store, settings, out).await,
        EntryCommand::New(args) => save(store, settings, "new", args, out).await,
        EntryCommand::Edit { id, fields } => {
            save(store, settings, &format!("{id}/edit"), fields, out).await
        }
        EntryCommand::Delete { id } => delete(store, EntryId::new(id), out).await,
    }
}

async fn list<C: CategoryStore, R: EntryRecords>(
    store: &EntryStore<C, R>,
    settings: &FormSettings,
    out: &mut impl Write,
) -> Result<()> {
    let mut list = EntryList::new(store);
    if let Err(failure) = list.load().await {
        return report_load_failure(failure, out);
    }

    if list.entries().is_empty() {
        writeln!(out, "No entries")?;
    }
    for entry in list.entries() {
        writeln!(out, "{}", entry_line(entry, settings))?;
    }
    Ok(())
}

async fn save<C: CategoryStore, R: EntryRecords>(
    store: &EntryStore<C, R>,
    settings: &FormSettings,
    route: &str,
    args: EntryArgs,
    out: &mut impl Write,
) -> Result<()> {
    let mut form = EntryFormController::new(store, settings.clone(), route)?;
    match form.load().await {
        Ok(()) => {}
        Err(LoadFailure::Categories(source)) => {
            writeln!(out, "warning: category list unavailable ({source})")?;
        }
        Err(failure) => return report_load_failure(failure, out),
    }

    writeln!(out, "{}", form.page_title())?;
    let values = [
        (EntryField::Name, args.name),
        (EntryField::Description, args.description),
        (EntryField::Type, args.entry_type),
        (EntryField::Amount, args.amount),
        (EntryField::Date, args.date),
        (EntryField::Paid, args.paid),
        (EntryField::CategoryId, args.category_id),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            form.set_field(field, value);
        }
    }

    match form.submit().await {
        Ok(entry) => {
            writeln!(out, "{SUCCESS_NOTICE}")?;
            writeln!(out, "{}", entry_line(&entry, settings))?;
            if let Some(route) = form.edit_route() {
                writeln!(out, "edit with: finance-cli entries edit {}", route.trim_end_matches("/edit"))?;
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
            if errors.contains_key(&EntryField::CategoryId) && !form.categories().is_empty() {
                let known: Vec<String> = form
                    .categories()
                    .iter()
                    .map(|category| match category.id {
                        Some(id) => format!("{id} {}", category.name),
                        None => category.name.clone(),
                    })
                    .collect();
                writeln!(out, "categories: {}", known.join(", "))?;
            }
            if errors.contains_key(&EntryField::Type) {
                let types: Vec<String> = form
                    .type_options()
                    .iter()
                    .map(|option| format!("{} ({})", option.value, option.label))
                    .collect();
                writeln!(out, "types: {}", types.join(", "))?;
            }
            bail!("entry form is invalid")
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

async fn delete<C: CategoryStore, R: EntryRecords>(
    store: &EntryStore<C, R>,
    id: EntryId,
    out: &mut impl Write,
) -> Result<()> {
    let mut list = EntryList::new(store);
    match list.delete(id).await {
        Ok(()) => {
            writeln!(out, "{SUCCESS_NOTICE}")?;
            Ok(())
        }
        Err(error) => {
            writeln!(out, "{FAILURE_NOTICE}")?;
            Err(error.into())
        }
    }
}

fn report_load_failure(failure: LoadFailure, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", failure.notice())?;
    Err(failure.into())
}

fn entry_line(entry: &Entry, settings: &FormSettings) -> String {
    let id = entry.id.map(|id| id.to_string()).unwrap_or_default();
    let category = entry
        .category
        .as_ref()
        .map_or_else(|| entry.category_id.to_string(), |category| category.name.clone());
    format!(
        "{id:>5}  {date}  {kind:<7}  {amount:>12}  {paid:<6}  {name}  [{category}]",
        date = entry.date.format(&settings.date_format),
        kind = entry.entry_type.label(),
        amount = entry.amount.format(settings.amount_format),
        paid = if entry.paid { "paid" } else { "unpaid" },
        name = entry.name,
    )
}
