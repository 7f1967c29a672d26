use std::fmt;

/// Convenience result type used across the crate.
pub type CoverResult<T> = Result<T, CoverError>;

/// Top-level error taxonomy used by engine and store APIs.
#[derive(thiserror::Error, Debug)]
pub enum CoverError {
    /// Unusable configuration (empty template catalog, bad config file, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// A referenced source file, movie, or image does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed render or board payload.
    #[error("validation error: {0}")]
    Validation(ValidationIssues),

    /// A public path resolved outside the sandboxed asset root.
    #[error("security error: {0}")]
    Security(String),

    /// Board write rejected because the caller's version is stale.
    #[error("version conflict: expected {expected}, current {current}")]
    Conflict {
        /// Version the caller based its write on.
        expected: u64,
        /// Version currently stored.
        current: u64,
    },

    /// Remote fetch failed (transport error, non-2xx status, non-image payload).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoverError {
    /// Build a [`CoverError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`CoverError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`CoverError::Validation`] value carrying a single issue.
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let mut issues = ValidationIssues::default();
        issues.push(field, msg);
        Self::Validation(issues)
    }

    /// Build a [`CoverError::Security`] value.
    pub fn security(msg: impl Into<String>) -> Self {
        Self::Security(msg.into())
    }

    /// Build a [`CoverError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`CoverError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for [`CoverError::Conflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// One failed field in a validated payload.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ValidationIssue {
    /// Dotted/indexed path of the offending field, e.g. `movies[2].x`.
    pub field: String,
    /// Human readable reason.
    pub message: String,
}

/// Structured list of validation failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ValidationIssues(Vec<ValidationIssue>);

impl ValidationIssues {
    /// Record a failed field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    /// `true` when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failed fields in the order they were found.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    /// `Ok(())` when empty, otherwise a [`CoverError::Validation`].
    pub fn into_result(self) -> CoverResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoverError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
