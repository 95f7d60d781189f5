use crate::commands::builtin::{filter_of, help_template};
use crate::config::Config;
use clap::{Arg, Command, ValueHint};
use log::info;
use netconf_client::error::NetconfClientResult;
use netconf_client::session::Session;

pub fn cli() -> Command {
    Command::new("get")
        .about("Execute get rpc")
        .help_template(help_template())
        .args([Arg::new("filter")
            .help("File containing subtree filter")
            .short('f')
            .long("filter")
            .value_hint(ValueHint::FilePath)])
}

pub async fn exec(cfg: &Config, session: &mut Session) -> NetconfClientResult<()> {
    let body = match filter_of(&cfg.args)? {
        Some(filter) => format!("<get>{}</get>", filter),
        None => "<get/>".to_string(),
    };
    let resp = session.rpc(&body).await?;
    info!(target: session.endpoint(), "Response:\n{}", resp);
    Ok(())
}
