use serde_json::Value;
use thiserror::Error;

use crate::models::MAX_ADDRESSES;

/// Rejections of an optimize request, checked in declaration order.
/// `Display` is the message returned to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid request body")]
    InvalidBody,
    #[error("Start address is required")]
    MissingStart,
    #[error("Addresses must be a non-empty array")]
    MissingAddresses,
    #[error("Maximum of {MAX_ADDRESSES} addresses allowed")]
    TooManyAddresses,
    #[error("Each address must be a non-empty string")]
    InvalidAddress,
}

/// Trimmed, checked input for the optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub start: String,
    pub stops: Vec<String>,
}

impl ValidatedRequest {
    /// Start first, then the stops in caller order.
    pub fn into_addresses(self) -> Vec<String> {
        let mut addresses = Vec::with_capacity(self.stops.len() + 1);
        addresses.push(self.start);
        addresses.extend(self.stops);
        addresses
    }
}

/// Validate a raw JSON body.
///
/// Works on an untyped [`Value`] so that a wrong type (a number for `start`,
/// an object for `addresses`) gets the same rule-specific message as a
/// missing field instead of a generic deserialisation error.
pub fn validate_request(body: &Value) -> Result<ValidatedRequest, ValidationError> {
    let fields = body.as_object().ok_or(ValidationError::InvalidBody)?;

    let start = fields
        .get("start")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|start| !start.is_empty())
        .ok_or(ValidationError::MissingStart)?;

    let addresses = fields
        .get("addresses")
        .and_then(Value::as_array)
        .filter(|addresses| !addresses.is_empty())
        .ok_or(ValidationError::MissingAddresses)?;

    if addresses.len() > MAX_ADDRESSES {
        return Err(ValidationError::TooManyAddresses);
    }

    let stops = addresses
        .iter()
        .map(|address| {
            address
                .as_str()
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_owned)
                .ok_or(ValidationError::InvalidAddress)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedRequest {
        start: start.to_owned(),
        stops,
    })
}
