use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unsafe sort parameter: {0}")]
    UnsafeSort(String),

    #[error("unknown sort column: {0}")]
    UnknownColumn(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
}

impl FilterError {
    /// Request parameter the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::UnsafeSort(_) | FilterError::UnknownColumn(_) => "sort",
            FilterError::OutOfRange { field, .. } => *field,
        }
    }
}
