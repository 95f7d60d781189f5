use crate::commands::builtin::help_template;
use crate::hello::ServerHello;
use clap::Command;
use log::info;
use netconf_client::error::NetconfClientResult;
use netconf_client::session::Session;

pub fn cli() -> Command {
    Command::new("hello")
        .about("Exchange hello and show server capabilities")
        .help_template(help_template())
}

pub fn exec(session: &Session, server_hello: &ServerHello) -> NetconfClientResult<()> {
    info!(
        target: session.endpoint(),
        "Session-id: {}",
        server_hello
            .session_id()
            .map_or("none".to_string(), |id| id.to_string())
    );
    for capability in server_hello.capabilities() {
        info!(target: session.endpoint(), "Capability: {}", capability);
    }
    Ok(())
}
