use crate::commands::*;
use crate::config::Config;
use crate::hello::ServerHello;
use clap::builder::{IntoResettable, ValueParser};
use clap::{Arg, ArgMatches, Command, ValueHint};
use netconf_client::error::NetconfClientResult;
use netconf_client::session::Session;
use std::fs;

pub fn builtin() -> Vec<Command> {
    vec![hello::cli(), rpc::cli(), get::cli(), get_config::cli()]
}

pub async fn builtin_exec(
    cmd: &str,
    session: &mut Session,
    args: &Config,
    server_hello: &ServerHello,
) -> Option<NetconfClientResult<()>> {
    let f = match cmd {
        "hello" => hello::exec(session, server_hello),
        "rpc" => rpc::exec(args, session).await,
        "get" => get::exec(args, session).await,
        "get-config" => get_config::exec(args, session).await,
        _ => return None,
    };
    Some(f)
}

pub(crate) fn value_of<'a, T: Clone + Send + Sync + 'static>(
    name: &str,
    args: &'a ArgMatches,
) -> &'a T {
    args.get_one::<T>(name).unwrap()
}

pub(crate) fn value_of_if_exists<'a, T: Clone + Send + Sync + 'static>(
    name: &str,
    args: &'a ArgMatches,
) -> Option<&'a T> {
    if args.contains_id(name) {
        args.get_one::<T>(name)
    } else {
        None
    }
}

pub(crate) fn values_of<'a, T: Clone + Send + Sync + 'static>(
    name: &str,
    args: &'a ArgMatches,
) -> Vec<&'a T> {
    args.get_many::<T>(name).unwrap_or_default().collect()
}

/// Reads the optional subtree filter file named by `--filter`.
pub(super) fn filter_of(args: &ArgMatches) -> NetconfClientResult<Option<String>> {
    match value_of_if_exists::<String>("filter", args) {
        Some(path) => {
            let filter = fs::read_to_string(path)?;
            Ok(Some(format!(
                r#"<filter type="subtree">{}</filter>"#,
                filter.trim()
            )))
        }
        None => Ok(None),
    }
}

pub(super) fn arg(
    name: &'static str,
    help: &'static str,
    required: bool,
    short: Option<char>,
    default: Option<&'static str>,
    hint: Option<ValueHint>,
    parser: impl IntoResettable<ValueParser>,
) -> Arg {
    Arg::new(name)
        .short(short)
        .long(name)
        .help(help)
        .required(required)
        .default_value(default)
        .value_hint(hint)
        .value_parser(parser)
}

pub(super) fn help_template() -> &'static str {
    color_print::cstr!(
        "\
{about-with-newline}
<green,bold>Usage:</> {usage}

<green,bold>Options:</>
{options}\n",
    )
}
