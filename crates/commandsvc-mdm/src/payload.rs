//! Command payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::Command;
use crate::error::VocabularyError;
use crate::request::CommandRequest;

/// A constructed command together with its generated identifier.
///
/// `command` is only `None` for payloads reconstructed from partial data;
/// [`Payload::from_request`] always sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Generated command identifier.
    pub command_uuid: String,
    /// The typed command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
}

impl Payload {
    /// Wraps a command with a freshly generated command identifier.
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command_uuid: Uuid::new_v4().to_string(),
            command: Some(command),
        }
    }

    /// Builds a payload from a command request.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError`] when the request type is unsupported or a
    /// field it requires is missing.
    pub fn from_request(request: &CommandRequest) -> Result<Self, VocabularyError> {
        Command::from_request(request).map(Self::new)
    }

    /// Returns the request type of the wrapped command, if any.
    #[must_use]
    pub fn request_type(&self) -> Option<&'static str> {
        self.command.as_ref().map(Command::request_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request_generates_distinct_command_uuids() {
        let request = CommandRequest::new("device-1", "ProfileList");

        let first = Payload::from_request(&request).unwrap();
        let second = Payload::from_request(&request).unwrap();

        assert_ne!(first.command_uuid, second.command_uuid);
        Uuid::parse_str(&first.command_uuid).unwrap();
        assert_eq!(first.request_type(), Some("ProfileList"));
    }

    #[test]
    fn test_json_envelope_shape() {
        let payload = Payload {
            command_uuid: "1234".into(),
            command: Some(Command::DeviceInformation {
                queries: vec!["UDID".into()],
            }),
        };

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "command_uuid": "1234",
                "command": { "request_type": "DeviceInformation", "queries": ["UDID"] },
            })
        );
    }
}
