use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::metrics;
use crate::db::types::ClientKind;
use crate::services::identity::{validate_identifier, Identifier, IdentifierKind};

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub(crate) fn validate_payload(payload: &impl Validate) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Checks `raw` against the identifier scheme `kind` calls for, counting rejections.
pub(crate) fn validate_document(kind: ClientKind, raw: &str) -> Result<Identifier, ApiError> {
    let kind = IdentifierKind::from(kind);
    validate_identifier(kind, raw).map_err(|err| {
        metrics::record_identifier_rejection(kind, &err);
        tracing::info!(kind = kind.label(), reason = err.reason(), "Rejected client document");
        ApiError::from(err)
    })
}

/// Accepts the spellings Go's `strconv.ParseBool` does; empty means "no filter".
pub(crate) fn parse_bool_filter(name: &str, raw: Option<&str>) -> Result<Option<bool>, ApiError> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Some(true)),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Some(false)),
        other => Err(ApiError::BadRequest(format!("Invalid value for '{name}': {other}"))),
    }
}
