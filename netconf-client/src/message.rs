use crate::{NETCONF_BASE_10_CAP, NETCONF_URN};
use core::fmt;
use core::fmt::Display;

/// Capabilities advertised in the client hello, in wire order.
pub const CLIENT_CAPABILITIES: [&str; 11] = [
    "urn:ietf:params:netconf:capability:writable-running:1.0",
    "urn:ietf:params:netconf:capability:rollback-on-error:1.0",
    "urn:ietf:params:netconf:capability:validate:1.0",
    "urn:ietf:params:netconf:capability:confirmed-commit:1.0",
    "urn:ietf:params:netconf:capability:url:1.0?scheme=http,ftp,file,https,sftp",
    NETCONF_BASE_10_CAP,
    "urn:liberouter:params:netconf:capability:power-control:1.0",
    "urn:ietf:params:netconf:capability:candidate:1.0",
    "urn:ietf:params:netconf:capability:xpath:1.0",
    "urn:ietf:params:netconf:capability:startup:1.0",
    "urn:ietf:params:netconf:capability:interleave:1.0",
];

/// The fixed client `<hello>` document.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hello;

impl Display for Hello {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(f, r#"<nc:hello xmlns:nc="{}">"#, NETCONF_URN)?;
        writeln!(f, "\t<nc:capabilities>")?;
        for capability in CLIENT_CAPABILITIES {
            writeln!(f, "\t\t<nc:capability>{}</nc:capability>", capability)?;
        }
        writeln!(f, "\t</nc:capabilities>")?;
        write!(f, "</nc:hello>")
    }
}

/// An `<rpc>` envelope around an opaque operation body.
///
/// No `message-id` is attached: replies are matched to requests by order.
#[derive(Debug, Clone, Copy)]
pub struct Rpc<'a> {
    body: &'a str,
}

impl<'a> Rpc<'a> {
    pub fn new(body: &'a str) -> Rpc<'a> {
        Rpc { body }
    }

    pub fn body(&self) -> &str {
        self.body
    }
}

impl Display for Rpc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<rpc>{}</rpc>", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_hello() {
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<nc:hello xmlns:nc="urn:ietf:params:xml:ns:netconf:base:1.0">
	<nc:capabilities>
		<nc:capability>urn:ietf:params:netconf:capability:writable-running:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:rollback-on-error:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:validate:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:confirmed-commit:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:url:1.0?scheme=http,ftp,file,https,sftp</nc:capability>
		<nc:capability>urn:ietf:params:netconf:base:1.0</nc:capability>
		<nc:capability>urn:liberouter:params:netconf:capability:power-control:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:candidate:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:xpath:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:startup:1.0</nc:capability>
		<nc:capability>urn:ietf:params:netconf:capability:interleave:1.0</nc:capability>
	</nc:capabilities>
</nc:hello>"#;
        assert_eq!(Hello.to_string(), expected);
    }

    #[test]
    fn test_hello_is_stable() {
        assert_eq!(Hello.to_string(), Hello.to_string());
        assert!(!Hello.to_string().contains(crate::framer::NETCONF_1_0_TERMINATOR));
    }

    #[test]
    fn test_serialize_rpc() {
        assert_eq!(Rpc::new("<get/>").to_string(), "<rpc><get/></rpc>");
        let get_config = Rpc::new("<get-config><source><running/></source></get-config>");
        assert_eq!(
            get_config.to_string(),
            "<rpc><get-config><source><running/></source></get-config></rpc>"
        );
        assert_eq!(get_config.body(), "<get-config><source><running/></source></get-config>");
    }
}
