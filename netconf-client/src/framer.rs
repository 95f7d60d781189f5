use crate::error::NetconfClientResult;
use async_trait::async_trait;
use core::time::Duration;

pub mod eom_framer;

pub const NETCONF_1_0_TERMINATOR: &str = "]]>]]>";

/// Trait for NETCONF framer
#[async_trait]
pub trait Framer: Send {
    /// Waits at most `timeout` for one complete message.
    async fn read_async(&mut self, timeout: Duration) -> NetconfClientResult<String>;
    async fn write_async(&mut self, message: &str) -> NetconfClientResult<()>;
}
