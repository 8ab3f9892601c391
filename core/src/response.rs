//! Decoding and validation of a transport response.

use crate::config::ResponseHook;
use crate::error::GatewayError;
use crate::http::TransportResponse;
use crate::schema::{Schema, ValidationResult};

/// Decode `response`, run the response hook on the decoded value, then
/// validate it against `schema`.
///
/// Only a body that is not JSON is an error. A value rejected by the schema
/// comes back as `ValidationResult::Failure`. `url` is used for error
/// context and logging only.
pub fn validate<S: Schema>(
    schema: &S,
    url: &str,
    response: TransportResponse,
    on_res: Option<&ResponseHook>,
) -> Result<ValidationResult<S::Output>, GatewayError> {
    let status = response.status;
    let value = response.decode_json().map_err(|source| {
        tracing::warn!(url, status, error = %source, "response body is not valid JSON");
        GatewayError::Decode {
            url: url.to_string(),
            status,
            source,
        }
    })?;

    let value = match on_res {
        Some(hook) => {
            tracing::trace!(url, status, "running response hook");
            hook(value)
        }
        None => value,
    };

    let result = ValidationResult::from(schema.validate(value));
    if let ValidationResult::Failure { error } = &result {
        tracing::debug!(url, status, issues = error.issues().len(), "response failed validation");
    }
    Ok(result)
}
