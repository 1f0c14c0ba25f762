//! Typed MDM commands.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::VocabularyError;
use crate::request::CommandRequest;

/// An MDM command. The variant name is the request type discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request_type")]
pub enum Command {
    /// Query device attributes.
    DeviceInformation {
        /// Attribute names to query. May be empty.
        #[serde(default)]
        queries: Vec<String>,
    },
    /// Install a configuration profile.
    InstallProfile {
        /// The raw (possibly signed) profile.
        #[serde(with = "base64_bytes")]
        payload: Vec<u8>,
    },
    /// Remove an installed configuration profile.
    RemoveProfile {
        /// The profile's `PayloadIdentifier`.
        identifier: String,
    },
    /// List installed configuration profiles.
    ProfileList,
    /// List installed applications.
    InstalledApplicationList {
        /// Bundle identifiers to restrict the answer to.
        #[serde(default)]
        identifiers: Vec<String>,
        /// Only report managed applications.
        #[serde(default)]
        managed_apps_only: bool,
    },
    /// Lock the device.
    DeviceLock {
        /// Find My PIN (macOS).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pin: Option<String>,
        /// Message shown on the lock screen.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Phone number shown on the lock screen.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phone_number: Option<String>,
    },
    /// Erase the device.
    EraseDevice {
        /// Find My PIN (macOS).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pin: Option<String>,
    },
    /// Restart the device.
    RestartDevice,
    /// Shut the device down.
    ShutDownDevice,
    /// Query security state.
    SecurityInfo,
    /// List installed certificates.
    CertificateList,
}

impl Command {
    /// Returns the request type discriminator for this command.
    #[must_use]
    pub const fn request_type(&self) -> &'static str {
        match self {
            Self::DeviceInformation { .. } => "DeviceInformation",
            Self::InstallProfile { .. } => "InstallProfile",
            Self::RemoveProfile { .. } => "RemoveProfile",
            Self::ProfileList => "ProfileList",
            Self::InstalledApplicationList { .. } => "InstalledApplicationList",
            Self::DeviceLock { .. } => "DeviceLock",
            Self::EraseDevice { .. } => "EraseDevice",
            Self::RestartDevice => "RestartDevice",
            Self::ShutDownDevice => "ShutDownDevice",
            Self::SecurityInfo => "SecurityInfo",
            Self::CertificateList => "CertificateList",
        }
    }

    /// Builds a command from a request, checking the fields its request type
    /// requires.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::UnsupportedRequestType`] for an unknown
    /// discriminator, and [`VocabularyError::MissingField`] or
    /// [`VocabularyError::InvalidField`] when a required field is absent or
    /// cannot be decoded.
    pub fn from_request(request: &CommandRequest) -> Result<Self, VocabularyError> {
        let request_type = request.request_type.as_str();
        let command = match request_type {
            "DeviceInformation" => Self::DeviceInformation {
                queries: request.queries.clone().unwrap_or_default(),
            },
            "InstallProfile" => {
                let encoded = required(request_type, "payload", request.payload.as_deref())?;
                let payload =
                    STANDARD
                        .decode(encoded)
                        .map_err(|e| VocabularyError::InvalidField {
                            request_type: request_type.to_owned(),
                            field: "payload",
                            reason: e.to_string(),
                        })?;
                if payload.is_empty() {
                    return Err(missing(request_type, "payload"));
                }
                Self::InstallProfile { payload }
            }
            "RemoveProfile" => Self::RemoveProfile {
                identifier: required(request_type, "identifier", request.identifier.as_deref())?
                    .to_owned(),
            },
            "ProfileList" => Self::ProfileList,
            "InstalledApplicationList" => Self::InstalledApplicationList {
                identifiers: request.identifiers.clone().unwrap_or_default(),
                managed_apps_only: request.managed_apps_only.unwrap_or(false),
            },
            "DeviceLock" => Self::DeviceLock {
                pin: request.pin.clone(),
                message: request.message.clone(),
                phone_number: request.phone_number.clone(),
            },
            "EraseDevice" => Self::EraseDevice {
                pin: request.pin.clone(),
            },
            "RestartDevice" => Self::RestartDevice,
            "ShutDownDevice" => Self::ShutDownDevice,
            "SecurityInfo" => Self::SecurityInfo,
            "CertificateList" => Self::CertificateList,
            other => return Err(VocabularyError::UnsupportedRequestType(other.to_owned())),
        };
        Ok(command)
    }
}

fn missing(request_type: &str, field: &'static str) -> VocabularyError {
    VocabularyError::MissingField {
        request_type: request_type.to_owned(),
        field,
    }
}

fn required<'a>(
    request_type: &str,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, VocabularyError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(request_type, field))
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_information_allows_empty_queries() {
        let request = CommandRequest::new("device-1", "DeviceInformation");

        let command = Command::from_request(&request).unwrap();

        assert_eq!(command, Command::DeviceInformation { queries: vec![] });
    }

    #[test]
    fn test_install_profile_decodes_base64_payload() {
        let request = CommandRequest {
            payload: Some(STANDARD.encode(b"<plist/>")),
            ..CommandRequest::new("device-1", "InstallProfile")
        };

        let command = Command::from_request(&request).unwrap();

        assert_eq!(
            command,
            Command::InstallProfile {
                payload: b"<plist/>".to_vec()
            }
        );
    }

    #[test]
    fn test_install_profile_without_payload_is_missing_field() {
        let request = CommandRequest::new("device-1", "InstallProfile");

        let err = Command::from_request(&request).unwrap_err();

        assert_eq!(
            err,
            VocabularyError::MissingField {
                request_type: "InstallProfile".into(),
                field: "payload",
            }
        );
    }

    #[test]
    fn test_install_profile_with_garbage_payload_is_invalid_field() {
        let request = CommandRequest {
            payload: Some("not base64!".into()),
            ..CommandRequest::new("device-1", "InstallProfile")
        };

        let err = Command::from_request(&request).unwrap_err();

        assert!(matches!(
            err,
            VocabularyError::InvalidField {
                field: "payload",
                ..
            }
        ));
    }

    #[test]
    fn test_remove_profile_requires_identifier() {
        let request = CommandRequest {
            identifier: Some(String::new()),
            ..CommandRequest::new("device-1", "RemoveProfile")
        };

        assert!(matches!(
            Command::from_request(&request),
            Err(VocabularyError::MissingField {
                field: "identifier",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_request_type_is_unsupported() {
        let request = CommandRequest::new("device-1", "DevicePropaganda");

        assert_eq!(
            Command::from_request(&request),
            Err(VocabularyError::UnsupportedRequestType(
                "DevicePropaganda".into()
            ))
        );
    }

    #[test]
    fn test_request_type_round_trips_through_from_request() {
        let commands = [
            "DeviceInformation",
            "ProfileList",
            "InstalledApplicationList",
            "DeviceLock",
            "EraseDevice",
            "RestartDevice",
            "ShutDownDevice",
            "SecurityInfo",
            "CertificateList",
        ];

        for request_type in commands {
            let command =
                Command::from_request(&CommandRequest::new("device-1", request_type)).unwrap();
            assert_eq!(command.request_type(), request_type);
        }
    }

    #[test]
    fn test_json_form_is_tagged_by_request_type() {
        let command = Command::InstallProfile {
            payload: b"abc".to_vec(),
        };

        let json = serde_json::to_value(&command).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "request_type": "InstallProfile", "payload": "YWJj" })
        );
        assert_eq!(serde_json::from_value::<Command>(json).unwrap(), command);
    }
}
