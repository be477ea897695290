use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A `FIELD=VALUE` selection could not be parsed.
    #[error("invalid filter '{input}': expected FIELD=VALUE")]
    InvalidFilter { input: String },

    #[error("unknown chart kind '{0}'")]
    UnknownChartKind(String),

    /// A chart entry is missing a field its kind needs.
    #[error("chart '{chart}' ({kind}) requires the '{role}' field")]
    MissingChartField {
        chart: String,
        kind: String,
        role: &'static str,
    },

    #[error("invalid report definition: {0}")]
    InvalidReport(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
