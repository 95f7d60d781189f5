use crate::commands::builtin::{value_of, value_of_if_exists, values_of};
use clap::ArgMatches;
use dirs::home_dir;
use log::{debug, error, warn};
use netconf_client::config::{SessionConfig, DEFAULT_PORT};
use netconf_client::error::{NetconfClientError, NetconfClientResult};
use ssh2_config::{HostParams, ParseRule, SshConfig};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub inner: Arc<Config>,
}

#[derive(Debug)]
pub struct Config {
    pub args: ArgMatches,
    pub ssh_config: Option<SshConfig>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub key_file: Option<PathBuf>,
    pub timeout: Duration,
    pub addresses: Vec<String>,
}

impl CliConfig {
    pub fn new(args: ArgMatches) -> NetconfClientResult<Self> {
        let mut ssh_dir = home_dir().unwrap_or(PathBuf::from("/"));
        ssh_dir.extend(Path::new(".ssh/config"));
        let ssh_config = read_ssh_config(&ssh_dir);
        let hosts = values_of::<String>("host", &args)
            .iter()
            .map(|h| h.to_string())
            .collect();
        let username = value_of_if_exists::<String>("username", &args).cloned();
        let password = value_of_if_exists::<String>("password", &args).cloned();
        let key_file = value_of_if_exists::<String>("key", &args).map(PathBuf::from);
        let timeout = Duration::from_secs(*value_of::<u64>("timeout", &args));
        Ok(Self {
            inner: Arc::new(Config {
                username,
                password,
                key_file,
                timeout,
                addresses: hosts,
                args,
                ssh_config,
            }),
        })
    }
}

fn read_ssh_config(dir: &Path) -> Option<SshConfig> {
    debug!("Trying to parse ssh configuration '{}'", dir.display());

    let mut reader = match File::open(dir) {
        Ok(f) => BufReader::new(f),
        Err(err) => {
            warn!(
                "Could not open ssh config file '{}', error: {}",
                dir.display(),
                err
            );
            return None;
        }
    };
    match SshConfig::default().parse(&mut reader, ParseRule::ALLOW_UNKNOWN_FIELDS) {
        Ok(config) => {
            debug!("Successfully parsed configuration");
            Some(config)
        }
        Err(err) => {
            error!("Failed to parse ssh configuration, error '{}'", err);
            None
        }
    }
}

#[derive(Debug)]
pub struct Host {
    pub(crate) address: String,
    config: SessionConfig,
}

impl Host {
    pub(crate) fn new(addr: &str, cfg: &Config) -> NetconfClientResult<Host> {
        let params = match &cfg.ssh_config {
            Some(ssh_config) => ssh_config.query(split_port(addr)?.0),
            None => HostParams::default(),
        };
        Host::with_params(addr, cfg, params)
    }

    fn with_params(addr: &str, cfg: &Config, params: HostParams) -> NetconfClientResult<Host> {
        let (address, port) = split_port(addr)?;
        let hostname = params.host_name.as_deref().unwrap_or(address);
        let port = port.or(params.port).unwrap_or(DEFAULT_PORT);

        let auth_user = match (&cfg.username, params.user.as_deref()) {
            (Some(user), _) => user.clone(),
            (None, Some(user)) => user.to_string(),
            (None, None) => whoami::username(),
        };

        let private_key = match &cfg.key_file {
            Some(path) => Some(fs::read_to_string(path)?),
            None => params
                .identity_file
                .as_ref()
                .and_then(|files| files.first())
                .and_then(|path| match fs::read_to_string(path) {
                    Ok(key) => Some(key),
                    Err(err) => {
                        warn!(
                            target: address,
                            "Could not read identity file '{}': {}",
                            path.display(),
                            err
                        );
                        None
                    }
                }),
        };

        if cfg.password.is_none() && private_key.is_none() {
            return Err(NetconfClientError::new(
                "No password or identity file provided".to_string(),
            ));
        }

        let mut config = SessionConfig::new(hostname, &auth_user)
            .with_port(port)
            .with_timeout(cfg.timeout);
        if let Some(password) = &cfg.password {
            config = config.with_password(password);
        }
        if let Some(key) = &private_key {
            config = config.with_private_key(key);
        }

        Ok(Host {
            address: format!("{}:{}", hostname, port),
            config,
        })
    }

    pub(crate) fn session_config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Splits `host[:port]`.
fn split_port(addr: &str) -> NetconfClientResult<(&str, Option<u16>)> {
    match addr.rsplit_once(':') {
        Some((address, port)) => {
            let port = port.parse::<u16>().map_err(|err| {
                NetconfClientError::new(format!("invalid port in '{}': {}", addr, err))
            })?;
            Ok((address, Some(port)))
        }
        None => Ok((addr, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(username: Option<&str>, password: Option<&str>) -> Config {
        Config {
            args: ArgMatches::default(),
            ssh_config: None,
            username: username.map(String::from),
            password: password.map(String::from),
            key_file: None,
            timeout: Duration::from_secs(5),
            addresses: vec![],
        }
    }

    #[test]
    fn test_split_port() {
        assert_eq!(split_port("router1").unwrap(), ("router1", None));
        assert_eq!(split_port("router1:2022").unwrap(), ("router1", Some(2022)));
        assert!(split_port("router1:ssh").is_err());
    }

    #[test]
    fn test_host_defaults() {
        let cfg = config(Some("admin"), Some("admin"));
        let host = Host::with_params("router1", &cfg, HostParams::default()).unwrap();
        assert_eq!(host.address, "router1:830");

        let session = host.session_config();
        assert_eq!(session.username(), "admin");
        assert_eq!(session.password(), Some("admin"));
        assert_eq!(session.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_host_uses_ssh_params() {
        let cfg = config(None, Some("secret"));
        let params = HostParams {
            host_name: Some("192.0.2.10".to_string()),
            port: Some(2830),
            user: Some("netops".to_string()),
            ..HostParams::default()
        };
        let host = Host::with_params("router1", &cfg, params).unwrap();
        assert_eq!(host.address, "192.0.2.10:2830");
        assert_eq!(host.session_config().username(), "netops");

        let params = HostParams {
            port: Some(2830),
            ..HostParams::default()
        };
        let host = Host::with_params("router1:830", &cfg, params).unwrap();
        assert_eq!(host.address, "router1:830");
    }

    #[test]
    fn test_host_requires_credentials() {
        let cfg = config(Some("admin"), None);
        assert!(Host::with_params("router1", &cfg, HostParams::default()).is_err());
    }
}
