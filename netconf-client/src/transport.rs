use crate::error::NetconfClientResult;
use async_trait::async_trait;
use core::time::Duration;

#[cfg(feature = "async-ssh2-lite")]
pub mod ssh;
pub mod stream;

/// Trait for NETCONF transport
///
/// A transport owns both directions of an established byte stream and frames
/// messages on it.
#[async_trait]
pub trait Transport: Send {
    async fn receive(&mut self, timeout: Duration) -> NetconfClientResult<String>;
    async fn write(&mut self, message: &str) -> NetconfClientResult<()>;
    async fn close(&mut self) -> NetconfClientResult<()>;
}
