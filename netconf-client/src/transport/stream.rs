use crate::error::{NetconfClientError, NetconfClientResult};
use crate::framer::eom_framer::EomFramer;
use crate::framer::Framer;
use crate::transport::Transport;
use async_trait::async_trait;
use core::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Transport over any already established duplex stream, e.g. a TCP tunnel
/// or an in-memory pipe.
pub struct StreamTransport<T> {
    framer: EomFramer<T>,
}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> StreamTransport<T> {
    pub fn new(stream: T) -> StreamTransport<T> {
        StreamTransport {
            framer: EomFramer::new(stream),
        }
    }

    pub fn into_inner(self) -> T {
        self.framer.into_inner()
    }
}

#[async_trait]
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for StreamTransport<T> {
    async fn receive(&mut self, timeout: Duration) -> NetconfClientResult<String> {
        self.framer.read_async(timeout).await
    }

    async fn write(&mut self, message: &str) -> NetconfClientResult<()> {
        self.framer.write_async(message).await
    }

    async fn close(&mut self) -> NetconfClientResult<()> {
        self.framer
            .get_mut()
            .shutdown()
            .await
            .map_err(NetconfClientError::TransportWriteFailed)
    }
}
