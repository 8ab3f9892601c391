//! Schemas and validation outcomes.
//!
//! A `Schema` turns a decoded JSON value into a typed result or a
//! `ValidationError`. The gateway treats it as opaque: it calls
//! `validate` exactly once per response and hands the outcome back to the
//! caller as a `ValidationResult`.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Validation contract for a decoded response body.
pub trait Schema: Send + Sync {
    /// The value produced when validation succeeds.
    type Output;

    fn validate(&self, value: Value) -> Result<Self::Output, ValidationError>;
}

impl<S: Schema + ?Sized> Schema for &S {
    type Output = S::Output;

    fn validate(&self, value: Value) -> Result<Self::Output, ValidationError> {
        (**self).validate(value)
    }
}

/// Accepts any value and returns it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Schema for Passthrough {
    type Output = Value;

    fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        Ok(value)
    }
}

/// Validates by deserializing into `T`.
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T> Typed<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for Typed<T> {}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> Schema for Typed<T> {
    type Output = T;

    fn validate(&self, value: Value) -> Result<T, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::new(e.to_string()))
    }
}

/// Schema backed by a closure.
#[derive(Clone)]
pub struct FnSchema<F>(F);

/// Build a schema from a closure.
///
/// ```
/// use gateway_core::schema::{from_fn, ValidationError};
///
/// let positive = from_fn(|value: serde_json::Value| match value.as_i64() {
///     Some(n) if n > 0 => Ok(n),
///     _ => Err(ValidationError::new("expected a positive integer")),
/// });
/// # let _ = positive;
/// ```
pub fn from_fn<F, T>(f: F) -> FnSchema<F>
where
    F: Fn(Value) -> Result<T, ValidationError> + Send + Sync,
{
    FnSchema(f)
}

impl<F, T> Schema for FnSchema<F>
where
    F: Fn(Value) -> Result<T, ValidationError> + Send + Sync,
{
    type Output = T;

    fn validate(&self, value: Value) -> Result<T, ValidationError> {
        (self.0)(value)
    }
}

/// A single reason a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location inside the value, e.g. `id` or `items.0.name`; empty for the
    /// root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Why a value did not match its schema. Always holds at least one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::at("", message)
    }

    pub fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    /// Add another issue to this error.
    pub fn with_issue(mut self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
        self
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating a decoded response.
///
/// A failed validation is a value, not an error: callers branch on it the
/// same way they would on `success` in a JSON envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult<T> {
    Success { data: T },
    Failure { error: ValidationError },
}

impl<T> ValidationResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ValidationResult::Success { data } => Some(data),
            ValidationResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Success { .. } => None,
            ValidationResult::Failure { error } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            ValidationResult::Success { data } => ValidationResult::Success { data: f(data) },
            ValidationResult::Failure { error } => ValidationResult::Failure { error },
        }
    }

    pub fn into_result(self) -> Result<T, ValidationError> {
        match self {
            ValidationResult::Success { data } => Ok(data),
            ValidationResult::Failure { error } => Err(error),
        }
    }
}

impl<T> From<Result<T, ValidationError>> for ValidationResult<T> {
    fn from(result: Result<T, ValidationError>) -> Self {
        match result {
            Ok(data) => ValidationResult::Success { data },
            Err(error) => ValidationResult::Failure { error },
        }
    }
}
