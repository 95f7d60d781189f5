use crate::session::SessionState;
use core::fmt;
use core::time::Duration;
use thiserror::Error;

pub type NetconfClientResult<T> = Result<T, NetconfClientError>;

#[derive(Debug, Error)]
pub enum NetconfClientError {
    #[error("failed to connect to {endpoint} ({stage}): {source}")]
    ConnectFailed {
        endpoint: String,
        stage: ConnectStage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("failed to write message: {0}")]
    TransportWriteFailed(#[source] std::io::Error),
    #[error("failed to read message: {0}")]
    TransportReadFailed(#[source] std::io::Error),
    /// The session must not be reused after a timeout.
    #[error("timed out after {0:?} waiting for NETCONF delimiter, most likely a bad NETCONF speaker")]
    TimedOut(Duration),
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        state: SessionState,
        operation: &'static str,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "async-ssh2-lite")]
    #[error(transparent)]
    Ssh(#[from] async_ssh2_lite::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl NetconfClientError {
    pub fn new(msg: String) -> Self {
        NetconfClientError::Anyhow(anyhow::Error::msg(msg))
    }

    pub(crate) fn connect_failed<E>(endpoint: &str, stage: ConnectStage, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        NetconfClientError::ConnectFailed {
            endpoint: endpoint.to_string(),
            stage,
            source: source.into(),
        }
    }

    /// Whether the error leaves the session unusable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, NetconfClientError::InvalidState { .. })
    }
}

/// Step of connection setup that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStage {
    Dial,
    Handshake,
    Authenticate,
    Channel,
}

impl fmt::Display for ConnectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            ConnectStage::Dial => "dial",
            ConnectStage::Handshake => "ssh handshake",
            ConnectStage::Authenticate => "authentication",
            ConnectStage::Channel => "subsystem channel",
        };
        f.write_str(stage)
    }
}
