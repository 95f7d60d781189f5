use crate::commands::builtin::{arg, filter_of, help_template, value_of};
use crate::config::Config;
use clap::{Command, ValueHint};
use log::info;
use netconf_client::error::NetconfClientResult;
use netconf_client::session::Session;

pub fn cli() -> Command {
    Command::new("get-config")
        .about("Execute get-config rpc")
        .help_template(help_template())
        .args([
            arg(
                "source",
                "Datastore to get config",
                false,
                Some('s'),
                Some("running"),
                None,
                ["running", "startup", "candidate"],
            ),
            arg(
                "filter",
                "File containing subtree filter",
                false,
                Some('f'),
                None,
                Some(ValueHint::FilePath),
                None,
            ),
        ])
}

fn get_config_body(source: &str, filter: Option<&str>) -> String {
    format!(
        "<get-config><source><{}/></source>{}</get-config>",
        source,
        filter.unwrap_or_default()
    )
}

pub async fn exec(cfg: &Config, session: &mut Session) -> NetconfClientResult<()> {
    let source = value_of::<String>("source", &cfg.args);
    let filter = filter_of(&cfg.args)?;
    let resp = session
        .rpc(&get_config_body(source, filter.as_deref()))
        .await?;
    info!(target: session.endpoint(), "Response:\n{}", resp);
    Ok(())
}
