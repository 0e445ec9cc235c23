use thiserror::Error;

/// Failure taxonomy surfaced by every solve/warm-restart operator.
///
/// `Data` is always raised before any numerical work starts. The other three
/// variants can only come out of the simplex iteration itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimplexError {
    #[error("invalid problem data: {0}")]
    Data(String),

    #[error("linear program has no feasible point")]
    Infeasible,

    #[error("objective is unbounded on the feasible region")]
    Unbounded,

    #[error("solver did not reach an optimum: {0}")]
    Difficult(String),
}

impl SimplexError {
    /// Name used by the JSON fixture schema's `exceptionClass` field.
    pub fn exception_class(&self) -> &'static str {
        match self {
            SimplexError::Data(_) => "SimplexDataException",
            SimplexError::Infeasible => "IncompatibleSimplexSolveException",
            SimplexError::Unbounded => "UnlimitedFunctionExtremumException",
            SimplexError::Difficult(_) => "DifficultSimplexSolveException",
        }
    }
}
