//! Binary event codec.
//!
//! Events are written with bincode over a private wire schema rather than
//! the domain types themselves: the JSON-facing `Command` is internally
//! tagged and base64-encodes profile bytes, neither of which belongs in the
//! archive. The wire schema carries the discriminator text next to a body
//! enum with one variant per command, and both conversions are exhaustive
//! matches, so adding a command variant fails to compile until the codec
//! carries its fields.
//!
//! Wire body variants are only ever appended: bincode writes the variant
//! index, and archived bytes must stay decodable.

use chrono::DateTime;
use commandsvc_mdm::{Command, Payload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CodecError;
use crate::event::Event;

#[derive(Debug, Serialize, Deserialize)]
struct WireEvent {
    id: String,
    time: i64,
    payload: Option<WirePayload>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePayload {
    command_uuid: String,
    command: Option<WireCommand>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireCommand {
    request_type: String,
    body: WireBody,
}

#[derive(Debug, Serialize, Deserialize)]
enum WireBody {
    DeviceInformation {
        queries: Vec<String>,
    },
    InstallProfile {
        payload: Vec<u8>,
    },
    RemoveProfile {
        identifier: String,
    },
    ProfileList,
    InstalledApplicationList {
        identifiers: Vec<String>,
        managed_apps_only: bool,
    },
    DeviceLock {
        pin: Option<String>,
        message: Option<String>,
        phone_number: Option<String>,
    },
    EraseDevice {
        pin: Option<String>,
    },
    RestartDevice,
    ShutDownDevice,
    SecurityInfo,
    CertificateList,
}

impl From<&Command> for WireCommand {
    fn from(command: &Command) -> Self {
        let body = match command.clone() {
            Command::DeviceInformation { queries } => WireBody::DeviceInformation { queries },
            Command::InstallProfile { payload } => WireBody::InstallProfile { payload },
            Command::RemoveProfile { identifier } => WireBody::RemoveProfile { identifier },
            Command::ProfileList => WireBody::ProfileList,
            Command::InstalledApplicationList {
                identifiers,
                managed_apps_only,
            } => WireBody::InstalledApplicationList {
                identifiers,
                managed_apps_only,
            },
            Command::DeviceLock {
                pin,
                message,
                phone_number,
            } => WireBody::DeviceLock {
                pin,
                message,
                phone_number,
            },
            Command::EraseDevice { pin } => WireBody::EraseDevice { pin },
            Command::RestartDevice => WireBody::RestartDevice,
            Command::ShutDownDevice => WireBody::ShutDownDevice,
            Command::SecurityInfo => WireBody::SecurityInfo,
            Command::CertificateList => WireBody::CertificateList,
        };
        Self {
            request_type: command.request_type().to_owned(),
            body,
        }
    }
}

impl TryFrom<WireCommand> for Command {
    type Error = CodecError;

    fn try_from(wire: WireCommand) -> Result<Self, Self::Error> {
        let command = match wire.body {
            WireBody::DeviceInformation { queries } => Self::DeviceInformation { queries },
            WireBody::InstallProfile { payload } => Self::InstallProfile { payload },
            WireBody::RemoveProfile { identifier } => Self::RemoveProfile { identifier },
            WireBody::ProfileList => Self::ProfileList,
            WireBody::InstalledApplicationList {
                identifiers,
                managed_apps_only,
            } => Self::InstalledApplicationList {
                identifiers,
                managed_apps_only,
            },
            WireBody::DeviceLock {
                pin,
                message,
                phone_number,
            } => Self::DeviceLock {
                pin,
                message,
                phone_number,
            },
            WireBody::EraseDevice { pin } => Self::EraseDevice { pin },
            WireBody::RestartDevice => Self::RestartDevice,
            WireBody::ShutDownDevice => Self::ShutDownDevice,
            WireBody::SecurityInfo => Self::SecurityInfo,
            WireBody::CertificateList => Self::CertificateList,
        };
        if command.request_type() != wire.request_type {
            return Err(CodecError::DiscriminatorMismatch {
                request_type: wire.request_type,
                body: command.request_type(),
            });
        }
        Ok(command)
    }
}

/// Encodes an event to its compact binary form.
///
/// # Errors
///
/// Returns [`CodecError::TimestampOutOfRange`] if the event time does not
/// fit in i64 nanoseconds, or [`CodecError::Encode`] if serialization fails.
pub fn encode(event: &Event) -> Result<Vec<u8>, CodecError> {
    let time = event
        .time
        .timestamp_nanos_opt()
        .ok_or(CodecError::TimestampOutOfRange(event.time))?;
    let wire = WireEvent {
        id: event.id.to_string(),
        time,
        payload: Some(WirePayload {
            command_uuid: event.payload.command_uuid.clone(),
            command: event.payload.command.as_ref().map(WireCommand::from),
        }),
    };
    bincode::serialize(&wire).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes an event previously produced by [`encode`].
///
/// A missing payload decodes to `Payload::default()` and a missing command
/// to `None`; neither is an error.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes,
/// [`CodecError::InvalidEventId`] for a non-UUID id, and
/// [`CodecError::DiscriminatorMismatch`] when the command body and its
/// request type disagree.
pub fn decode(bytes: &[u8]) -> Result<Event, CodecError> {
    let wire: WireEvent =
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    let id = Uuid::parse_str(&wire.id).map_err(|_| CodecError::InvalidEventId(wire.id))?;
    let payload = match wire.payload {
        None => Payload::default(),
        Some(payload) => Payload {
            command_uuid: payload.command_uuid,
            command: payload.command.map(Command::try_from).transpose()?,
        },
    };
    Ok(Event {
        id,
        time: DateTime::from_timestamp_nanos(wire.time),
        payload,
    })
}
