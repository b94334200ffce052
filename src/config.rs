use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{logging, market::Principal};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(
    author = "Stormarket Contributors",
    version = "0.1.0",
    about = "Stormarket",
    long_about = r#"Stormarket is the ledger of a decentralized storage marketplace"#
)]
pub struct Config {
    #[clap(
        long,
        env = "LOG_FORMAT",
        help = "Log format (plain, json)",
        default_value = "plain"
    )]
    pub log_format: logging::Format,

    #[clap(
        long,
        env = "API_PORT",
        help = "Port number for the API server (e.g., 8080)",
        default_value = "9444"
    )]
    pub api_port: u16,

    #[clap(
        long,
        env = "DATA_DIR",
        help = "Directory path for the ledger database and optional TLS cert.pem/key.pem"
    )]
    pub data_dir: PathBuf,

    #[clap(
        long,
        env = "ADMINISTRATOR",
        help = "Principal allowed to resolve disputes (e.g. ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM)"
    )]
    pub administrator: Principal,
}

impl Config {
    pub fn new_na(data_dir: PathBuf) -> Self {
        Self {
            log_format: logging::Format::Plain,
            api_port: 0,
            data_dir,
            administrator: Principal::new("deployer"),
        }
    }

    pub fn should_use_tls(&self) -> bool {
        let cert_path = self.data_dir.join("cert.pem");
        let key_path = self.data_dir.join("key.pem");
        cert_path.exists() && key_path.exists()
    }
}
