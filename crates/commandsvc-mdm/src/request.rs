//! Caller-supplied command requests.

use serde::{Deserialize, Serialize};

/// An instruction to create a command for one device.
///
/// The shape is flat: `udid` and `request_type` are always present, the
/// remaining fields are only read by the request types that use them. Every
/// field defaults when missing so that an empty JSON object still decodes and
/// is rejected by validation rather than by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Device identifier.
    #[serde(default)]
    pub udid: String,
    /// Command discriminator, e.g. `DeviceInformation`.
    #[serde(default)]
    pub request_type: String,
    /// `DeviceInformation` queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<String>>,
    /// `InstallProfile` payload, base64 encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// `RemoveProfile` profile identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// `InstalledApplicationList` bundle identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Vec<String>>,
    /// `InstalledApplicationList` filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_apps_only: Option<bool>,
    /// `DeviceLock` / `EraseDevice` PIN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    /// `DeviceLock` lock screen message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `DeviceLock` contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl CommandRequest {
    /// Creates a request with only the device and request type set.
    #[must_use]
    pub fn new(udid: impl Into<String>, request_type: impl Into<String>) -> Self {
        Self {
            udid: udid.into(),
            request_type: request_type.into(),
            ..Self::default()
        }
    }

    /// Sets the `DeviceInformation` queries.
    #[must_use]
    pub fn with_queries<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries = Some(queries.into_iter().map(Into::into).collect());
        self
    }
}
