use finance_client::StoreError;
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

use super::FieldError;

pub const SUCCESS_NOTICE: &str = "Request processed successfully";
pub const FAILURE_NOTICE: &str = "An error occurred while processing your request";
pub const LOAD_FAILURE_NOTICE: &str = "A server error occurred, please try again later.";
pub const COMMUNICATION_FAILURE: &str =
    "Communication with the server failed. Please try again later.";

/// Token that selects the create form.
const NEW_SEGMENT: &str = "new";
/// Resource prefixes a form route may start with.
pub const ENTRIES_RESOURCE: &str = "entries";
pub const CATEGORIES_RESOURCE: &str = "categories";

/// Whether a form creates a record or edits the one with the given id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

impl<Id: Copy> FormMode<Id> {
    pub fn id(&self) -> Option<Id> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("empty route")]
    Empty,
    #[error("route segment {0:?} is neither \"new\" nor a record id")]
    InvalidId(String),
}

/// Resolves the form mode from a route such as `new`, `42/edit` or `/entries/42/edit`.
///
/// Only `resource` is accepted as a prefix; another resource's prefix is an invalid route.
pub fn resolve_mode<Id: FromStr>(
    route: &str,
    resource: &str,
) -> Result<FormMode<Id>, RouteError> {
    let mut segments = route.split('/').filter(|segment| !segment.is_empty()).peekable();
    if segments.peek() == Some(&resource) {
        segments.next();
    }

    match segments.next() {
        None => Err(RouteError::Empty),
        Some(NEW_SEGMENT) => Ok(FormMode::Create),
        Some(segment) => segment
            .parse()
            .map(FormMode::Edit)
            .map_err(|_| RouteError::InvalidId(segment.to_string())),
    }
}

/// Lifecycle of one form activation.
///
/// `Failed` and `Succeeded` accept a new submission; `LoadFailed` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState<T> {
    Loading,
    Idle,
    Submitting,
    Failed(Vec<String>),
    Succeeded(T),
    LoadFailed(LoadFailure),
}

impl<T> FormState<T> {
    pub fn accepts_submit(&self) -> bool {
        matches!(
            self,
            FormState::Idle | FormState::Failed(_) | FormState::Succeeded(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            FormState::Loading => "loading",
            FormState::Idle => "idle",
            FormState::Submitting => "submitting",
            FormState::Failed(_) => "failed",
            FormState::Succeeded(_) => "succeeded",
            FormState::LoadFailed(_) => "load failed",
        }
    }
}

/// Loading data for a form or list did not succeed. No retry is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadFailure {
    #[error("could not load {kind} {id}: {source}")]
    Record {
        kind: &'static str,
        id: i64,
        #[source]
        source: StoreError,
    },
    #[error("could not load categories: {0}")]
    Categories(#[source] StoreError),
    #[error("could not load entries: {0}")]
    Entries(#[source] StoreError),
}

impl LoadFailure {
    /// Text for the blocking notice shown to the user.
    pub fn notice(&self) -> &'static str {
        LOAD_FAILURE_NOTICE
    }
}

/// Why a submit call did not produce a saved record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError<K: Ord + fmt::Debug> {
    /// The field-set is invalid; nothing was sent.
    #[error("form is invalid: {0:?}")]
    Invalid(BTreeMap<K, Vec<FieldError>>),
    /// The form is loading, submitting or failed to load; nothing was sent.
    #[error("form cannot be submitted while {0}")]
    Busy(&'static str),
    /// The store rejected the write. `messages` is what the user should see.
    #[error("submission failed: {source}")]
    Failed {
        messages: Vec<String>,
        #[source]
        source: StoreError,
    },
}

/// User-facing messages for a failed write.
///
/// A server validation failure yields its own messages; anything else yields
/// exactly one generic message.
pub fn server_error_messages(error: &StoreError) -> Vec<String> {
    match error.validation_messages() {
        Some(messages) => messages.to_vec(),
        None => vec![COMMUNICATION_FAILURE.to_string()],
    }
}
