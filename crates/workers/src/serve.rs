use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use shared::{
    codec::{encode_collection, encode_payload, frame_codec},
    domain::Spell,
    protocol::ServiceKind,
};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// What a worker does after handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Reply(Vec<u8>),
    /// Send the acknowledgment, then stop serving.
    Shutdown(Vec<u8>),
}

impl Step {
    pub fn empty() -> Self {
        Step::Reply(Vec::new())
    }

    pub fn collection(spells: &[Spell]) -> Self {
        match encode_collection(spells) {
            Ok(bytes) => Step::Reply(bytes),
            Err(error) => {
                warn!(%error, "failed to encode collection reply");
                Step::empty()
            }
        }
    }

    pub fn shutdown_with<T: serde::Serialize>(ack: &T) -> Self {
        match encode_payload(ack) {
            Ok(bytes) => Step::Shutdown(bytes),
            Err(error) => {
                warn!(%error, "failed to encode shutdown acknowledgment");
                Step::Shutdown(Vec::new())
            }
        }
    }
}

pub trait Worker: Send {
    type Request: DeserializeOwned;

    fn kind(&self) -> ServiceKind;

    fn handle(&mut self, request: Self::Request) -> Step;

    /// Handles one raw frame; undecodable requests get an empty reply.
    fn handle_frame(&mut self, frame: &[u8]) -> Step {
        match serde_json::from_slice::<Self::Request>(frame) {
            Ok(request) => self.handle(request),
            Err(error) => {
                warn!(service = %self.kind(), %error, "rejecting malformed request");
                Step::empty()
            }
        }
    }
}

/// Serves one connection at a time and one request at a time until the
/// worker sees its shutdown sentinel.
pub async fn serve<W: Worker>(listener: TcpListener, mut worker: W) -> anyhow::Result<()> {
    let service = worker.kind();
    let addr = listener.local_addr()?;
    info!(%service, %addr, "worker listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%service, %peer, "accepted connection");
        let mut framed = Framed::new(stream, frame_codec());

        while let Some(frame) = framed.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(error) => {
                    warn!(%service, %peer, %error, "dropping connection after bad frame");
                    break;
                }
            };

            match worker.handle_frame(&frame) {
                Step::Reply(reply) => {
                    debug!(%service, bytes = reply.len(), "sending reply");
                    if let Err(error) = framed.send(Bytes::from(reply)).await {
                        warn!(%service, %peer, %error, "failed to send reply");
                        break;
                    }
                }
                Step::Shutdown(ack) => {
                    if let Err(error) = framed.send(Bytes::from(ack)).await {
                        warn!(%service, %peer, %error, "failed to acknowledge shutdown");
                    }
                    info!(%service, "shutdown acknowledged");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/serve_tests.rs"]
mod tests;
