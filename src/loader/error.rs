//! Errors raised while loading a machine from data.

use crate::builder::BuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid machine definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Unknown conditions or actions: {}", .0.join(", "))]
    UnknownCallables(Vec<String>),

    #[error("Machine '{machine}' has no states")]
    EmptyMachine { machine: String },

    #[error("Machine '{machine}' cannot use a '{target}' transition")]
    TargetNotAllowed { machine: String, target: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_callables_are_listed() {
        let err = LoadError::UnknownCallables(vec!["isEof".to_string(), "store".to_string()]);
        assert_eq!(
            err.to_string(),
            "Unknown conditions or actions: isEof, store"
        );
    }

    #[test]
    fn build_errors_are_transparent() {
        let err = LoadError::from(BuildError::NoErrorMachine);
        assert_eq!(err.to_string(), BuildError::NoErrorMachine.to_string());
    }
}
