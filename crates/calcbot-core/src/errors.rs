use serde::{Deserialize, Serialize};

/// Core error type for the bot plumbing (config and messaging).
///
/// Calculation failures are *not* represented here: they are ordinary values
/// (`ErrorKind`) returned by the validator and the evaluator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Classified failure of validating or evaluating an expression.
///
/// The serde names double as keys of the user-facing message table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TooLong,
    InvalidSyntax,
    DivisionByZero,
    MathDomain,
    CalculationError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::TooLong,
        ErrorKind::InvalidSyntax,
        ErrorKind::DivisionByZero,
        ErrorKind::MathDomain,
        ErrorKind::CalculationError,
    ];

    /// Stable identifier, e.g. `division_by_zero`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::TooLong => "too_long",
            ErrorKind::InvalidSyntax => "invalid_syntax",
            ErrorKind::DivisionByZero => "division_by_zero",
            ErrorKind::MathDomain => "math_domain",
            ErrorKind::CalculationError => "calculation_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
