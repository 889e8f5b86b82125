//! Command-line definitions and conversion into role configs

use crate::client::ClientConfig;
use crate::protocol::{DEFAULT_IP, DEFAULT_PORT};
use crate::server::ServerConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Connect and send a file, or every file under a directory
    Send,
    /// Listen and save incoming files
    Recv,
}

/// Command-line arguments
#[derive(Clone, Debug, Parser)]
#[command(
    name = "transmitter",
    version,
    about = "Minimal point-to-point file transfer over TCP"
)]
pub struct Args {
    #[arg(value_enum)]
    pub action: Action,

    /// File or directory to send (required for send, ignored by recv)
    #[arg(required_if_eq("action", "send"))]
    pub filename: Option<PathBuf>,

    /// Address to connect to (send) or bind (recv)
    #[arg(default_value = DEFAULT_IP)]
    pub ip: String,

    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Append DEBUG-level log lines to this file
    #[arg(long = "log-file", default_value = "transmitter.log")]
    pub log_file: PathBuf,

    /// Show debug messages on the console
    #[arg(short, long)]
    pub verbose: bool,

    /// Keep received files under this directory (recv only)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Announce file names relative to this directory (send only)
    #[arg(long)]
    pub base: Option<PathBuf>,
}

impl Args {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.ip.clone(),
            port: self.port,
            root: self.root.clone(),
        }
    }

    /// `None` when no filename was given
    pub fn client_config(&self) -> Option<ClientConfig> {
        self.filename.as_ref().map(|target| ClientConfig {
            host: self.ip.clone(),
            port: self.port,
            target: target.clone(),
            base: self.base.clone(),
        })
    }
}
