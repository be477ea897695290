use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("unknown field '{field}' (available: {available})")]
    UnknownField { field: String, available: String },

    /// A selected value never occurs in the field.
    #[error("'{value}' is not an observed value of {field} (choices: {choices})")]
    UnknownValue {
        field: String,
        value: String,
        choices: String,
    },

    /// A selected value matches several observed values that differ only in case.
    #[error("'{value}' matches several values of {field} ignoring case ({matches}); use the exact spelling")]
    AmbiguousValue {
        field: String,
        value: String,
        matches: String,
    },

    #[error("chart '{chart}' needs a numeric {role} field, but {field} is categorical")]
    NotNumeric {
        chart: String,
        role: &'static str,
        field: String,
    },

    #[error(transparent)]
    Model(#[from] anemia_model::ModelError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
