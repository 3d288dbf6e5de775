use std::collections::HashMap;

/// Collects field-tagged validation failures.
///
/// Every check runs; only the first failure recorded for a field is kept so
/// the client sees one message per field in a single round-trip.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no check has failed.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` under `field` unless the field already has one.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> HashMap<String, String> {
        self.errors
    }
}

/// True when `value` appears in `permitted`.
pub fn permitted_value<T: PartialEq + ?Sized>(value: &T, permitted: &[&T]) -> bool {
    permitted.iter().any(|candidate| *candidate == value)
}
