//! # netconf-client
//!
//! ```toml
//! netconf-client = "^0.1.0"
//! ```
//!
//! A NETCONF 1.0 client speaking end-of-message (`]]>]]>`) framing over SSH
//! or any other duplex byte stream. Requests are strictly serial: one
//! request is written, then its reply is awaited under a timeout.
//!
//! ## Example
//!
//! ```rust,no_run
//! use netconf_client::config::SessionConfig;
//! use netconf_client::session::Session;
//!
//! # async fn run() -> netconf_client::error::NetconfClientResult<()> {
//! let config = SessionConfig::new("192.0.2.1", "admin").with_password("admin");
//! let mut session = Session::connect(&config).await?;
//! let hello = session.hello().await?;
//! println!("{}", hello);
//! let reply = session.rpc("<get-config><source><running/></source></get-config>").await?;
//! println!("{}", reply);
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
pub mod config;
pub mod error;
pub mod framer;
pub mod message;
pub mod session;
pub mod transport;

pub const NETCONF_URN: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
pub const NETCONF_BASE_10_CAP: &str = "urn:ietf:params:netconf:base:1.0";
pub const NETCONF_SUBSYSTEM: &str = "netconf";
