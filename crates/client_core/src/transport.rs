use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use shared::{codec::frame_codec, protocol::ServiceKind};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

use crate::error::ClientError;

/// One request frame out, one reply frame back.
#[async_trait]
pub trait WorkerTransport: Send + Sync {
    async fn round_trip(&self, payload: Vec<u8>) -> Result<Vec<u8>, ClientError>;
}

/// Opens a fresh connection for every round trip.
#[derive(Debug, Clone)]
pub struct TcpWorkerTransport {
    service: ServiceKind,
    addr: String,
    timeout: Option<Duration>,
}

impl TcpWorkerTransport {
    pub fn new(service: ServiceKind, addr: impl Into<String>) -> Self {
        Self {
            service,
            addr: addr.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn unreachable(&self, source: std::io::Error) -> ClientError {
        ClientError::Unreachable {
            service: self.service,
            addr: self.addr.clone(),
            source,
        }
    }

    async fn exchange(&self, payload: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| self.unreachable(source))?;
        let mut framed = Framed::new(stream, frame_codec());

        framed
            .send(Bytes::from(payload))
            .await
            .map_err(|source| self.unreachable(source))?;

        match framed.next().await {
            Some(Ok(frame)) => {
                debug!(service = %self.service, bytes = frame.len(), "received reply");
                Ok(frame.to_vec())
            }
            Some(Err(source)) => Err(self.unreachable(source)),
            None => Err(ClientError::NoReply {
                service: self.service,
                addr: self.addr.clone(),
            }),
        }
    }
}

#[async_trait]
impl WorkerTransport for TcpWorkerTransport {
    async fn round_trip(&self, payload: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        let Some(limit) = self.timeout else {
            return self.exchange(payload).await;
        };
        tokio::time::timeout(limit, self.exchange(payload))
            .await
            .map_err(|_| ClientError::Timeout {
                service: self.service,
                addr: self.addr.clone(),
                timeout: limit,
            })?
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
