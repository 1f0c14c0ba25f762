//! Command service contract.

use std::sync::Arc;

use async_trait::async_trait;
use commandsvc_mdm::{CommandRequest, Payload};

use crate::error::CommandError;

/// Message for requests without a device identifier.
pub const MISSING_UDID: &str = "request must contain the UDID of the device";
/// Message for requests without a request type.
pub const MISSING_REQUEST_TYPE: &str = "request must contain a request type";

/// Checks the fields every request needs before anything else runs.
///
/// # Errors
///
/// Returns [`CommandError::Validation`] if `udid` or `request_type` is empty.
pub fn validate_request(request: &CommandRequest) -> Result<(), CommandError> {
    if request.udid.is_empty() {
        return Err(CommandError::Validation(MISSING_UDID.into()));
    }
    if request.request_type.is_empty() {
        return Err(CommandError::Validation(MISSING_REQUEST_TYPE.into()));
    }
    Ok(())
}

/// Creates MDM command payloads from requests.
///
/// Middleware wraps one implementation in another; every layer implements
/// this same trait.
#[async_trait]
pub trait CommandService: Send + Sync {
    /// Builds, archives and publishes a command for `request`.
    async fn new_command(&self, request: &CommandRequest) -> Result<Payload, CommandError>;
}

#[async_trait]
impl<S> CommandService for Arc<S>
where
    S: CommandService + ?Sized,
{
    async fn new_command(&self, request: &CommandRequest) -> Result<Payload, CommandError> {
        (**self).new_command(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_fails_validation() {
        let err = validate_request(&CommandRequest::default()).unwrap_err();

        assert!(matches!(err, CommandError::Validation(message) if message == MISSING_UDID));
    }

    #[test]
    fn test_request_without_type_fails_validation() {
        let err = validate_request(&CommandRequest::new("device-1", "")).unwrap_err();

        assert!(matches!(err, CommandError::Validation(message) if message == MISSING_REQUEST_TYPE));
    }

    #[test]
    fn test_unknown_request_type_passes_validation() {
        assert!(validate_request(&CommandRequest::new("device-1", "DevicePropaganda")).is_ok());
    }
}
