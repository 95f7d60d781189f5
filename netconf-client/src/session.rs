#[cfg(feature = "async-ssh2-lite")]
use crate::config::SessionConfig;
use crate::error::{NetconfClientError, NetconfClientResult};
use crate::message::{Hello, Rpc};
#[cfg(feature = "async-ssh2-lite")]
use crate::transport::ssh::SSHTransport;
use crate::transport::Transport;
use core::fmt;
use core::time::Duration;
use log::{debug, warn};

/// Where a [`Session`] is in the hello / request / reply sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport is established, nothing exchanged yet.
    Connected,
    HandshakeSent,
    Ready,
    AwaitingReply,
    /// A write, read or timeout failed. The stream position is unknown and
    /// the session can only be closed.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            SessionState::Connected => "connected",
            SessionState::HandshakeSent => "waiting for server hello",
            SessionState::Ready => "ready",
            SessionState::AwaitingReply => "awaiting reply",
            SessionState::Failed => "failed",
        };
        f.write_str(state)
    }
}

/// One NETCONF conversation with a device.
///
/// Writes and reads strictly alternate and at most one request is
/// outstanding; operations issued out of order fail with
/// [`NetconfClientError::InvalidState`] without touching the transport.
/// After any transport error or timeout the session is `Failed` and must be
/// closed and rebuilt.
pub struct Session {
    transport: Box<dyn Transport + Send + 'static>,

    endpoint: String,
    timeout: Duration,
    state: SessionState,
}

impl Session {
    pub fn new<T>(transport: T, endpoint: &str, timeout: Duration) -> Session
    where
        T: Transport + 'static,
    {
        Session {
            transport: Box::from(transport),
            endpoint: endpoint.to_string(),
            timeout,
            state: SessionState::Connected,
        }
    }

    /// Opens an SSH connection and the `netconf` subsystem. The handshake is
    /// not performed; call [`Session::hello`] next.
    #[cfg(feature = "async-ssh2-lite")]
    pub async fn connect(config: &SessionConfig) -> NetconfClientResult<Session> {
        let transport = SSHTransport::connect(config).await?;
        let endpoint = config.endpoint();
        debug!("Connected to {} as '{}'", endpoint, config.username());
        Ok(Session::new(transport, &endpoint, config.timeout()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Writes one framed message. The first write of a session is the
    /// handshake, later ones are requests.
    pub async fn write(&mut self, payload: &str) -> NetconfClientResult<()> {
        let next = match self.state {
            SessionState::Connected => SessionState::HandshakeSent,
            SessionState::Ready => SessionState::AwaitingReply,
            _ => return Err(self.invalid("write")),
        };
        self.transport
            .write(payload)
            .await
            .map_err(|err| self.fail(err))?;
        self.state = next;
        Ok(())
    }

    /// Waits up to the session timeout for the reply to the last write.
    pub async fn read(&mut self) -> NetconfClientResult<String> {
        match self.state {
            SessionState::HandshakeSent | SessionState::AwaitingReply => {}
            _ => return Err(self.invalid("read")),
        }
        let message = self
            .transport
            .receive(self.timeout)
            .await
            .map_err(|err| self.fail(err))?;
        self.state = SessionState::Ready;
        Ok(message)
    }

    /// Sends the client hello and returns the server hello unaltered.
    pub async fn hello(&mut self) -> NetconfClientResult<String> {
        if self.state != SessionState::Connected {
            return Err(self.invalid("send hello"));
        }
        self.write(&Hello.to_string()).await?;
        let response = self.read().await?;
        debug!("Hello from {}:\n{}", self.endpoint, response);
        Ok(response)
    }

    /// Wraps `body` in `<rpc>` and returns the reply unaltered.
    pub async fn rpc(&mut self, body: &str) -> NetconfClientResult<String> {
        if self.state != SessionState::Ready {
            return Err(self.invalid("send rpc"));
        }
        self.write(&Rpc::new(body).to_string()).await?;
        let response = self.read().await?;
        debug!("RPC reply from {}:\n{}", self.endpoint, response);
        Ok(response)
    }

    /// Releases the protocol channel and the underlying transport.
    pub async fn close(mut self) -> NetconfClientResult<()> {
        debug!("Closing session to {} ({})", self.endpoint, self.state);
        self.transport.close().await
    }

    fn fail(&mut self, err: NetconfClientError) -> NetconfClientError {
        warn!("Session to {} failed while {}: {}", self.endpoint, self.state, err);
        self.state = SessionState::Failed;
        err
    }

    fn invalid(&self, operation: &'static str) -> NetconfClientError {
        warn!("Refusing to {} on {} while {}", operation, self.endpoint, self.state);
        NetconfClientError::InvalidState {
            state: self.state,
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::NETCONF_1_0_TERMINATOR;
    use crate::transport::stream::StreamTransport;
    use pretty_assertions::assert_eq;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
    use tokio::join;
    use tokio::time::{sleep, Instant};

    const SERVER_HELLO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
  </capabilities>

  <session-id>4</session-id>
</hello>"#;

    fn session(timeout: Duration) -> (Session, DuplexStream) {
        let (client, server) = duplex(8192);
        let session = Session::new(StreamTransport::new(client), "loopback", timeout);
        (session, server)
    }

    async fn read_request(server: &mut DuplexStream) -> String {
        let mut received = Vec::new();
        let mut buffer = [0u8; 256];
        while !received.ends_with(NETCONF_1_0_TERMINATOR.as_bytes()) {
            let bytes = server.read(&mut buffer).await.unwrap();
            assert!(bytes > 0, "client closed the stream");
            received.extend(&buffer[..bytes]);
        }
        String::from_utf8(received).unwrap()
    }

    async fn reply(server: &mut DuplexStream, message: &str) {
        server
            .write_all(format!("{}\n{}\n", message, NETCONF_1_0_TERMINATOR).as_bytes())
            .await
            .unwrap();
    }

    async fn handshake(session: &mut Session, server: &mut DuplexStream) {
        let (response, _) = join!(session.hello(), async {
            read_request(server).await;
            reply(server, SERVER_HELLO).await;
        });
        assert_eq!(response.unwrap(), SERVER_HELLO);
    }

    #[tokio::test]
    async fn test_hello_exchange() {
        let (mut session, mut server) = session(Duration::from_secs(30));
        assert_eq!(session.state(), SessionState::Connected);

        let (response, request) = join!(session.hello(), async {
            let request = read_request(&mut server).await;
            reply(&mut server, SERVER_HELLO).await;
            request
        });
        assert_eq!(request, format!("{}{}", Hello, NETCONF_1_0_TERMINATOR));
        assert_eq!(response.unwrap(), SERVER_HELLO);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_rpc_envelope() {
        let (mut session, mut server) = session(Duration::from_secs(30));
        handshake(&mut session, &mut server).await;

        let (response, request) = join!(session.rpc("<get/>"), async {
            let request = read_request(&mut server).await;
            reply(&mut server, "<rpc-reply>\n  <ok/>\n</rpc-reply>").await;
            request
        });
        assert_eq!(request, "<rpc><get/></rpc>]]>]]>");
        assert_eq!(response.unwrap(), "<rpc-reply>\n  <ok/>\n</rpc-reply>");
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_rpc_before_hello() {
        let (mut session, _server) = session(Duration::from_secs(30));
        let err = session.rpc("<get/>").await.unwrap_err();
        assert!(matches!(
            err,
            NetconfClientError::InvalidState {
                state: SessionState::Connected,
                operation: "send rpc"
            }
        ));
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_read_without_request() {
        let (mut session, mut server) = session(Duration::from_secs(30));
        assert!(matches!(
            session.read().await,
            Err(NetconfClientError::InvalidState { .. })
        ));

        handshake(&mut session, &mut server).await;
        assert!(matches!(
            session.read().await,
            Err(NetconfClientError::InvalidState {
                state: SessionState::Ready,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_single_outstanding_request() {
        let (mut session, mut server) = session(Duration::from_secs(30));
        handshake(&mut session, &mut server).await;

        session.write("<rpc><get/></rpc>").await.unwrap();
        assert_eq!(session.state(), SessionState::AwaitingReply);
        let err = session.write("<rpc><commit/></rpc>").await.unwrap_err();
        assert!(matches!(
            err,
            NetconfClientError::InvalidState {
                state: SessionState::AwaitingReply,
                ..
            }
        ));
        assert!(matches!(
            session.rpc("<commit/>").await,
            Err(NetconfClientError::InvalidState { .. })
        ));

        assert_eq!(read_request(&mut server).await, "<rpc><get/></rpc>]]>]]>");
        reply(&mut server, "<rpc-reply/>").await;
        assert_eq!(session.read().await.unwrap(), "<rpc-reply/>");
        assert_eq!(session.state(), SessionState::Ready);
    }

    async fn delayed_hello(timeout: Duration) -> (Session, NetconfClientResult<String>, Duration) {
        let (mut session, mut server) = session(timeout);
        let ((response, elapsed), _) = join!(
            async {
                let start = Instant::now();
                let response = session.hello().await;
                (response, start.elapsed())
            },
            async {
                read_request(&mut server).await;
                sleep(Duration::from_secs(5)).await;
                server.write_all(b"<rpc-reply/>]]>]]>").await.unwrap();
            }
        );
        (session, response, elapsed)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_after_timeout() {
        let timeout = Duration::from_secs(2);
        let (mut session, response, elapsed) = delayed_hello(timeout).await;

        assert!(matches!(response, Err(NetconfClientError::TimedOut(t)) if t == timeout));
        assert!(elapsed < timeout + Duration::from_millis(50));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(matches!(
            session.rpc("<get/>").await,
            Err(NetconfClientError::InvalidState {
                state: SessionState::Failed,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_within_timeout() {
        let (session, response, _) = delayed_hello(Duration::from_secs(10)).await;
        assert_eq!(response.unwrap(), "<rpc-reply/>");
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_closed_stream_fails_session() {
        let (mut session, mut server) = session(Duration::from_secs(30));
        let (response, _) = join!(session.hello(), async {
            read_request(&mut server).await;
            server.write_all(b"<hello>\n").await.unwrap();
            server.shutdown().await.unwrap();
        });
        assert!(matches!(
            response,
            Err(NetconfClientError::TransportReadFailed(_))
        ));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_write_failure_fails_session() {
        let (mut session, mut server) = session(Duration::from_secs(30));
        handshake(&mut session, &mut server).await;
        drop(server);

        let err = session.rpc("<get/>").await.unwrap_err();
        assert!(matches!(err, NetconfClientError::TransportWriteFailed(_)));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(matches!(
            session.rpc("<get/>").await,
            Err(NetconfClientError::InvalidState {
                state: SessionState::Failed,
                operation: "send rpc"
            })
        ));
        assert!(matches!(
            session.read().await,
            Err(NetconfClientError::InvalidState {
                state: SessionState::Failed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_close() {
        let (mut session, mut server) = session(Duration::from_secs(30));
        handshake(&mut session, &mut server).await;
        session.close().await.unwrap();

        let mut rest = Vec::new();
        server.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }
}
