use crate::commands::builtin::{builtin, builtin_exec};
use crate::config::{CliConfig, Host};
use crate::hello::ServerHello;
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgAction, Command,
};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, error, info, warn};
use netconf_client::error::{NetconfClientError, NetconfClientResult};
use netconf_client::session::Session;
use netconf_client::NETCONF_BASE_10_CAP;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::{select, signal};

pub async fn exec(cmd: String, cfg: CliConfig) -> NetconfClientResult<()> {
    let hosts = &cfg.inner.addresses;
    if hosts.is_empty() {
        return Err(NetconfClientError::new(
            "No hosts given, use --host or NETCONF_HOST".to_string(),
        ));
    }
    let mut futures = FuturesUnordered::new();
    for addr in hosts {
        let host = Host::new(addr, &cfg.inner)?;
        let start_time = Instant::now();
        let cmd_clone = cmd.clone();
        let cfg_clone = cfg.clone();
        let handle: JoinHandle<NetconfClientResult<()>> = tokio::spawn(async move {
            let target = host.address.as_str();
            let mut session = Session::connect(host.session_config()).await?;
            info!(target: target, "Connected to host");

            let response = session.hello().await?;
            let server_hello = ServerHello::parse(&response)?;
            debug!(
                target: target,
                "Started Netconf session with session-id: {}",
                server_hello.session_id().unwrap_or(0)
            );
            if !server_hello.has_capability(NETCONF_BASE_10_CAP) {
                warn!(target: target, "Host does not advertise {}", NETCONF_BASE_10_CAP);
            }

            match builtin_exec(&cmd_clone, &mut session, &cfg_clone.inner, &server_hello).await {
                Some(result) => result,
                None => Err(NetconfClientError::new(format!("Unknown command '{}'", cmd_clone))),
            }?;

            info!(target: target, "Operation took: {:.3}s", start_time.elapsed().as_secs_f32());
            session.close().await?;
            Ok(())
        });
        futures.push(handle);
    }

    select! {
        result = signal::ctrl_c() => {
            warn!("Interrupted, abandoning running hosts");
            result.map_err(NetconfClientError::Io)
        }
        _ = async {
            while let Some(handle) = futures.next().await {
                match handle {
                    Ok(result) => {
                        if let Err(err) = result {
                            error!("Task failed with error: {}", err);
                        } else {
                            debug!("Task completed successfully")
                        }
                    }
                    Err(err) => error!("Task failed: {}", err),
                }
            }
        } => {
            Ok(())
        }
    }
}

pub fn cli() -> Command {
    Command::new(crate_name!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .version(crate_version!())
        .long_version(crate_version!())
        .arg_required_else_help(true)
        .allow_external_subcommands(false)
        .bin_name("netconf")
        .display_name("netconf")
        .help_template(color_print::cstr!(
            "\
{about-with-newline}
<green,bold>Author:</> {author}

<green,bold>Usage:</> {usage}

<green,bold>Options:</>
{options}

<green,bold>Commands:</>
    <cyan,bold>hello</>             Exchange hello and show server capabilities
    <cyan,bold>get</>               Execute get rpc
    <cyan,bold>get-config</>        Execute get-config rpc
    <cyan,bold>rpc</>               Execute raw rpc

See '<cyan,bold>netconf help</> <cyan><<command>></>' for more information on a specific command.\n",
        ))
        .args([
            arg!(-v --verbose ... "Use verbose output (-vv to log all rpc responses, -vvv to print also rpc requests)")
                .global(true),
            arg!(-q --quiet "Disable logging completely")
                .global(true),
            global_opt("host", "Host to connect, host[:port]")
                .env("NETCONF_HOST")
                .action(ArgAction::Append)
                .value_delimiter(','),
            global_opt("username", "Username for netconf connection")
                .env("NETCONF_USERNAME"),
            global_opt("password", "Password for netconf connection")
                .env("NETCONF_PASSWORD")
                .hide_env(true),
            global_opt("key", "Private key file for netconf connection")
                .env("NETCONF_KEY")
                .value_hint(clap::ValueHint::FilePath),
            global_opt("timeout", "Seconds to wait for each reply")
                .env("NETCONF_TIMEOUT")
                .default_value("30")
                .value_parser(value_parser!(u64)),
        ])
        .subcommands(builtin())
}

fn global_opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).help(help).long(name).global(true)
}

#[test]
fn verify_cli() {
    cli().debug_assert();
}
