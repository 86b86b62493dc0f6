use std::time::Duration;

use shared::{error::ProtocolError, protocol::ServiceKind};
use thiserror::Error;

/// Failure of one orchestrator call. Bookmark state is never touched when one
/// of these is returned.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{service} worker at {addr} is unreachable: {source}")]
    Unreachable {
        service: ServiceKind,
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{service} worker at {addr} did not reply within {timeout:?}")]
    Timeout {
        service: ServiceKind,
        addr: String,
        timeout: Duration,
    },
    #[error("{service} worker at {addr} closed the connection without replying")]
    NoReply { service: ServiceKind, addr: String },
    #[error("{service} worker sent a reply that could not be decoded: {source}")]
    Protocol {
        service: ServiceKind,
        #[source]
        source: ProtocolError,
    },
    #[error("failed to encode {service} request: {source}")]
    Encode {
        service: ServiceKind,
        #[source]
        source: ProtocolError,
    },
}

impl ClientError {
    pub fn service(&self) -> ServiceKind {
        match self {
            ClientError::Unreachable { service, .. }
            | ClientError::Timeout { service, .. }
            | ClientError::NoReply { service, .. }
            | ClientError::Protocol { service, .. }
            | ClientError::Encode { service, .. } => *service,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Unreachable { .. } | ClientError::Timeout { .. } | ClientError::NoReply { .. }
        )
    }
}
