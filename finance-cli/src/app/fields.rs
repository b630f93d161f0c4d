use std::{collections::BTreeMap, fmt, sync::Arc};
use thiserror::Error;

type ParseCheck = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// A constraint on one form control.
#[derive(Clone)]
pub enum Rule {
    Required,
    MaxLength(usize),
    /// The value must be accepted by the check. Empty values are left to `Required`.
    Parses(ParseCheck),
}

impl Rule {
    pub fn parses(check: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Self {
        Rule::Parses(Arc::new(check))
    }

    fn check(&self, value: &str) -> Option<FieldError> {
        let trimmed = value.trim();
        match self {
            Rule::Required if trimmed.is_empty() => Some(FieldError::Required),
            Rule::MaxLength(max) if trimmed.chars().count() > *max => Some(FieldError::MaxLength {
                max: *max,
                actual: trimmed.chars().count(),
            }),
            Rule::Parses(check) if !trimmed.is_empty() => check(trimmed).err().map(FieldError::Invalid),
            _ => None,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "Required"),
            Rule::MaxLength(max) => write!(f, "MaxLength({max})"),
            Rule::Parses(_) => write!(f, "Parses(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("is required")]
    Required,
    #[error("must be at most {max} characters (got {actual})")]
    MaxLength { max: usize, actual: usize },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
struct Field {
    value: String,
    rules: Vec<Rule>,
    errors: Vec<FieldError>,
}

impl Field {
    fn validate(&mut self) {
        self.errors = self
            .rules
            .iter()
            .filter_map(|rule| rule.check(&self.value))
            .collect();
    }
}

/// Text-valued form controls keyed by `K`, each validated on every change.
#[derive(Debug, Clone)]
pub struct FieldSet<K: Ord> {
    fields: BTreeMap<K, Field>,
}

impl<K: Ord + Copy + fmt::Debug> FieldSet<K> {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Adds a control with its initial value.
    pub fn with_field(mut self, key: K, initial: impl Into<String>, rules: Vec<Rule>) -> Self {
        let mut field = Field {
            value: initial.into(),
            rules,
            errors: Vec::new(),
        };
        field.validate();
        self.fields.insert(key, field);
        self
    }

    /// Replaces the value of `key` and revalidates it. Unknown keys are ignored.
    pub fn set(&mut self, key: K, value: impl Into<String>) -> &[FieldError] {
        match self.fields.get_mut(&key) {
            Some(field) => {
                field.value = value.into();
                field.validate();
                &field.errors
            }
            None => &[],
        }
    }

    pub fn value(&self, key: K) -> &str {
        self.fields
            .get(&key)
            .map(|field| field.value.as_str())
            .unwrap_or_default()
    }

    /// The trimmed value, or `None` when blank.
    pub fn optional_value(&self, key: K) -> Option<String> {
        let value = self.value(key).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn field_errors(&self, key: K) -> &[FieldError] {
        self.fields
            .get(&key)
            .map(|field| field.errors.as_slice())
            .unwrap_or_default()
    }

    pub fn validate_all(&mut self) {
        self.fields.values_mut().for_each(Field::validate);
    }

    pub fn is_valid(&self) -> bool {
        self.fields.values().all(|field| field.errors.is_empty())
    }

    /// Every failing control with its errors.
    pub fn errors(&self) -> BTreeMap<K, Vec<FieldError>> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.errors.is_empty())
            .map(|(key, field)| (*key, field.errors.clone()))
            .collect()
    }
}

impl<K: Ord + Copy + fmt::Debug> Default for FieldSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Key {
        Name,
        Count,
        Note,
    }

    fn form() -> FieldSet<Key> {
        FieldSet::new()
            .with_field(Key::Name, "", vec![Rule::Required, Rule::MaxLength(2)])
            .with_field(
                Key::Count,
                "1",
                vec![
                    Rule::Required,
                    Rule::parses(|v| v.parse::<u8>().map(|_| ()).map_err(|e| e.to_string())),
                ],
            )
            .with_field(Key::Note, "", vec![])
    }

    #[test]
    fn initial_values_are_validated() {
        let form = form();
        assert!(!form.is_valid());
        assert_eq!(form.field_errors(Key::Name), &[FieldError::Required]);
        assert!(form.field_errors(Key::Count).is_empty());
    }

    #[test]
    fn every_change_revalidates() {
        let mut form = form();

        assert_eq!(
            form.set(Key::Name, "abc"),
            &[FieldError::MaxLength { max: 2, actual: 3 }]
        );
        assert!(form.set(Key::Name, "ab").is_empty());
        assert!(form.is_valid());

        assert!(matches!(form.set(Key::Count, "many"), [FieldError::Invalid(_)]));
        assert!(!form.is_valid());
    }

    #[test]
    fn blank_values_only_fail_required() {
        let mut form = form();
        assert_eq!(form.set(Key::Count, "  "), &[FieldError::Required]);
    }

    #[test]
    fn max_length_ignores_surrounding_whitespace() {
        let mut form = form();
        assert!(form.set(Key::Name, " ab ").is_empty());
        assert_eq!(
            form.set(Key::Name, " abc"),
            &[FieldError::MaxLength { max: 2, actual: 3 }]
        );
    }

    #[test]
    fn errors_lists_failing_fields_only() {
        let mut form = form();
        form.set(Key::Count, "x");

        let errors = form.errors();
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![Key::Name, Key::Count]);
    }

    #[test]
    fn optional_value_treats_blank_as_none() {
        let mut form = form();
        assert_eq!(form.optional_value(Key::Note), None);
        form.set(Key::Note, " lunch ");
        assert_eq!(form.optional_value(Key::Note), Some("lunch".to_string()));
    }
}
