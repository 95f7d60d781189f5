use netconf_client::error::{NetconfClientError, NetconfClientResult};
use quick_xml::de::from_str;
use serde_derive::Deserialize;

/// The parts of a server `<hello>` the cli reports on.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "hello")]
pub struct ServerHello {
    #[serde(default)]
    capabilities: Capabilities,
    #[serde(rename = "session-id")]
    session_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct Capabilities {
    #[serde(default)]
    capability: Vec<String>,
}

impl ServerHello {
    pub fn parse(response: &str) -> NetconfClientResult<ServerHello> {
        from_str(response).map_err(|err| {
            NetconfClientError::Anyhow(anyhow::Error::from(err).context("malformed server hello"))
        })
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities.capability
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities
            .capability
            .iter()
            .any(|cap| cap == capability)
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session_id
    }
}
