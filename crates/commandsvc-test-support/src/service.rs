//! A mock `CommandService` with an invocation flag.

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use commandsvc_core::error::CommandError;
use commandsvc_core::service::CommandService;
use commandsvc_mdm::{Command, CommandRequest, Payload};

type Responder = Box<dyn Fn(&CommandRequest) -> Result<Payload, CommandError> + Send + Sync>;

/// The payload `MockCommandService::returning_mock_payload` answers with.
#[must_use]
pub fn mock_payload() -> Payload {
    Payload {
        command_uuid: "1234".into(),
        command: Some(Command::DeviceInformation { queries: vec![] }),
    }
}

/// A command service that records whether and with what it was called and
/// answers from a configured closure.
pub struct MockCommandService {
    invoked: AtomicBool,
    requests: Mutex<Vec<CommandRequest>>,
    respond: Responder,
}

impl MockCommandService {
    /// Creates a mock answering every call with `respond`.
    #[must_use]
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&CommandRequest) -> Result<Payload, CommandError> + Send + Sync + 'static,
    {
        Self {
            invoked: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// A mock that always returns [`mock_payload`].
    #[must_use]
    pub fn returning_mock_payload() -> Self {
        Self::new(|_| Ok(mock_payload()))
    }

    /// A mock that always fails with the error built by `error`.
    #[must_use]
    pub fn failing(error: fn() -> CommandError) -> Self {
        Self::new(move |_| Err(error()))
    }

    /// Returns whether `new_command` was called.
    pub fn was_invoked(&self) -> bool {
        self.invoked.load(Ordering::Acquire)
    }

    /// Returns every request received, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl fmt::Debug for MockCommandService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCommandService")
            .field("invoked", &self.was_invoked())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CommandService for MockCommandService {
    async fn new_command(&self, request: &CommandRequest) -> Result<Payload, CommandError> {
        self.invoked.store(true, Ordering::Release);
        self.requests.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}
