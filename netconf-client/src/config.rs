use core::fmt;
use core::time::Duration;

pub const DEFAULT_PORT: u16 = 830;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters for opening a [`Session`](crate::session::Session) over SSH.
#[derive(Clone)]
pub struct SessionConfig {
    hostname: String,
    port: u16,
    username: String,
    password: Option<String>,
    private_key: Option<String>,
    timeout: Duration,
}

impl SessionConfig {
    pub fn new(hostname: &str, username: &str) -> SessionConfig {
        SessionConfig {
            hostname: hostname.to_string(),
            port: DEFAULT_PORT,
            username: username.to_string(),
            password: None,
            private_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Private key material in PEM/OpenSSH format, not a path.
    pub fn with_private_key(mut self, key: &str) -> Self {
        self.private_key = Some(key.to_string());
        self
    }

    /// How long a read waits for the end-of-message delimiter.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    pub fn has_credentials(&self) -> bool {
        self.password.is_some() || self.private_key.is_some()
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
