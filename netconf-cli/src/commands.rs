pub mod builtin;
mod get;
mod get_config;
mod hello;
mod rpc;
