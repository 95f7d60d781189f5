use crate::config::SessionConfig;
use crate::error::{ConnectStage, NetconfClientError, NetconfClientResult};
use crate::framer::eom_framer::EomFramer;
use crate::framer::Framer;
use crate::transport::Transport;
use crate::NETCONF_SUBSYSTEM;
use async_ssh2_lite::{ssh2, AsyncChannel, AsyncSession, SessionConfiguration};
use async_trait::async_trait;
use core::time::Duration;
use log::{debug, warn};
use tokio::net::TcpStream;
use tokio::time::timeout;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SSHTransport {
    session: AsyncSession<TcpStream>,
    framer: EomFramer<AsyncChannel<TcpStream>>,
}

impl SSHTransport {
    /// Dials `config.endpoint()`, authenticates and opens the `netconf`
    /// subsystem. Every failure is reported as
    /// [`NetconfClientError::ConnectFailed`] with the stage that failed.
    pub async fn connect(config: &SessionConfig) -> NetconfClientResult<SSHTransport> {
        let endpoint = config.endpoint();
        if !config.has_credentials() {
            return Err(NetconfClientError::connect_failed(
                &endpoint,
                ConnectStage::Authenticate,
                "no password or private key provided",
            ));
        }

        let stream = timeout(
            CONNECT_TIMEOUT,
            TcpStream::connect((config.hostname(), config.port())),
        )
        .await
        .map_err(failed_at(&endpoint, ConnectStage::Dial))?
        .map_err(failed_at(&endpoint, ConnectStage::Dial))?;
        debug!("Established TCP connection to {}", endpoint);

        let mut configuration = SessionConfiguration::new();
        configuration.set_timeout(10_000);
        let mut session = AsyncSession::new(stream, configuration)
            .map_err(failed_at(&endpoint, ConnectStage::Handshake))?;
        session
            .handshake()
            .await
            .map_err(failed_at(&endpoint, ConnectStage::Handshake))?;

        authenticate(&session, config, &endpoint).await?;
        Self::from_session(&endpoint, session).await
    }

    /// Opens the `netconf` subsystem on an already authenticated session.
    pub async fn from_session(
        endpoint: &str,
        session: AsyncSession<TcpStream>,
    ) -> NetconfClientResult<SSHTransport> {
        if !session.authenticated() {
            return Err(NetconfClientError::connect_failed(
                endpoint,
                ConnectStage::Authenticate,
                "ssh session is not authenticated",
            ));
        }
        let mut channel = session
            .channel_session()
            .await
            .map_err(failed_at(endpoint, ConnectStage::Channel))?;
        channel
            .subsystem(NETCONF_SUBSYSTEM)
            .await
            .map_err(failed_at(endpoint, ConnectStage::Channel))?;
        debug!("Opened '{}' subsystem on {}", NETCONF_SUBSYSTEM, endpoint);

        Ok(SSHTransport {
            session,
            framer: EomFramer::new(channel),
        })
    }
}

#[async_trait]
impl Transport for SSHTransport {
    async fn receive(&mut self, timeout: Duration) -> NetconfClientResult<String> {
        self.framer.read_async(timeout).await
    }

    async fn write(&mut self, message: &str) -> NetconfClientResult<()> {
        self.framer.write_async(message).await
    }

    async fn close(&mut self) -> NetconfClientResult<()> {
        let channel = self.framer.get_mut();
        channel.send_eof().await?;
        channel.close().await?;
        channel.wait_close().await?;
        self.session
            .disconnect(Some(ssh2::ByApplication), "Shutdown", None)
            .await?;
        Ok(())
    }
}

/// Tries the private key first, then the password.
async fn authenticate(
    session: &AsyncSession<TcpStream>,
    config: &SessionConfig,
    endpoint: &str,
) -> NetconfClientResult<()> {
    let user = config.username();
    if let Some(key) = config.private_key() {
        debug!("Trying public key authentication to {} as '{}'", endpoint, user);
        if let Err(err) = session.userauth_pubkey_memory(user, None, key, None).await {
            warn!("Public key authentication to {} failed: {}", endpoint, err);
        }
    }
    if !session.authenticated() {
        if let Some(password) = config.password() {
            debug!("Trying password authentication to {} as '{}'", endpoint, user);
            session
                .userauth_password(user, password)
                .await
                .map_err(failed_at(endpoint, ConnectStage::Authenticate))?;
        }
    }

    if session.authenticated() {
        Ok(())
    } else {
        Err(NetconfClientError::connect_failed(
            endpoint,
            ConnectStage::Authenticate,
            format!("no authentication method accepted for user '{}'", user),
        ))
    }
}

fn failed_at<E>(endpoint: &str, stage: ConnectStage) -> impl Fn(E) -> NetconfClientError + '_
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    move |err| NetconfClientError::connect_failed(endpoint, stage, err)
}
