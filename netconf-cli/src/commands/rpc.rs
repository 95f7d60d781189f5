use crate::commands::builtin::{arg, help_template, value_of_if_exists};
use crate::config::Config;
use clap::{ArgGroup, Command, ValueHint};
use log::info;
use netconf_client::error::{NetconfClientError, NetconfClientResult};
use netconf_client::session::Session;
use std::fs;

pub fn cli() -> Command {
    Command::new("rpc")
        .about("Execute raw rpc")
        .help_template(help_template())
        .args([
            arg(
                "body",
                "Operation to wrap in <rpc>, e.g. '<get/>'",
                false,
                Some('b'),
                None,
                None,
                None,
            ),
            arg(
                "file",
                "File containing the operation",
                false,
                Some('f'),
                None,
                Some(ValueHint::FilePath),
                None,
            ),
        ])
        .group(
            ArgGroup::new("operation")
                .args(["body", "file"])
                .required(true),
        )
}

pub async fn exec(cfg: &Config, session: &mut Session) -> NetconfClientResult<()> {
    let body = match (
        value_of_if_exists::<String>("body", &cfg.args),
        value_of_if_exists::<String>("file", &cfg.args),
    ) {
        (Some(body), _) => body.trim().to_string(),
        (None, Some(path)) => fs::read_to_string(path)?.trim().to_string(),
        (None, None) => {
            return Err(NetconfClientError::new(
                "rpc requires --body or --file".to_string(),
            ))
        }
    };
    let resp = session.rpc(&body).await?;
    info!(target: session.endpoint(), "Response:\n{}", resp);
    Ok(())
}
